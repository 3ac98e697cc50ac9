//! API Routes
//!
//! Route handlers organized by functionality.

pub mod admin;
pub mod auth;
pub mod health;
pub mod investments;
pub mod kyc;
pub mod referrals;
pub mod views;
