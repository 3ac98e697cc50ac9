//! # WealthDesk
//!
//! Role-based wealth management service. Investors, wealth partners and
//! admins (maker/checker) each get their own dashboard; all data lives in a
//! hosted database/auth/storage backend reached over HTTP.
//!
//! ## Modules
//!
//! - [`auth`]: roles, permissions, path access rules and the route guard
//! - [`backend`]: the data-source and auth-provider seam, remote and fixture
//! - [`services`]: accounts, referrals, investments, KYC and invites
//! - [`api`]: HTTP server with Axum: JSON API, admin handlers, dashboard views
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wealthdesk::{serve, AppState, Backend, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load_default()?;
//!     let backend = Backend::from_config(&config.backend)?;
//!
//!     serve(AppState::new(backend, config)).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod backend;
pub mod config;
pub mod models;
pub mod services;

// Re-export top-level types for convenience
pub use api::{build_router, serve, ApiError, AppState};

pub use auth::{
    get_redirect_path, guard_view, is_allowed, landing_path_for, validate_role_access,
    AccessDecision, Permission, Role, Viewer,
};

pub use backend::{
    AuthError, AuthProvider, Backend, DataError, DataSource, FixtureBackend, RemoteBackend,
};

pub use config::{BackendMode, Config, ConfigError};

pub use services::{
    AccountService, InvestmentService, InviteService, KycService, ReferralError, ReferralService,
};
