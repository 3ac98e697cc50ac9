//! Application Services
//!
//! The operations behind the dashboards and handlers. Each service holds the
//! shared data source and performs plain reads, validations and single-row
//! writes against it:
//!
//! - [`AccountService`]: registration and login
//! - [`ReferralService`]: partner referrals and the duplicate check
//! - [`InvestmentService`]: ICD / bond / REIT requests and portfolio summary
//! - [`KycService`]: document upload and KYC status
//! - [`InviteService`]: admin invitations

mod accounts;
mod investments;
mod invites;
mod kyc;
mod referrals;

pub use accounts::{AccountError, AccountService, Registration, SignedIn};
pub use investments::{
    InvestmentEntry, InvestmentError, InvestmentService, NewInvestmentRequest, PortfolioSummary,
};
pub use invites::{InviteError, InviteService};
pub use kyc::{DocumentUpload, KycError, KycService};
pub use referrals::{NewReferral, ReferralError, ReferralService, ReferralSummary};

use regex::Regex;
use std::sync::OnceLock;

/// Loose address check: something@something.tld, no spaces
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| {
            Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
        })
        .is_match(email)
}

/// Trimmed, lowercased email
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
