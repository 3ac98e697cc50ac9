//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::backend::Backend;
use crate::config::Config;
use crate::services::{AccountService, InvestmentService, InviteService, KycService, ReferralService};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Data source and auth provider selected at startup
    pub backend: Backend,
    pub config: Arc<Config>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    pub accounts: AccountService,
    pub referrals: ReferralService,
    pub investments: InvestmentService,
    pub kyc: KycService,
    pub invites: InviteService,
}

impl AppState {
    pub fn new(backend: Backend, config: Config) -> Self {
        let data = backend.data.clone();
        Self {
            accounts: AccountService::new(
                data.clone(),
                backend.auth.clone(),
                config.registration.clone(),
            ),
            referrals: ReferralService::new(data.clone()),
            investments: InvestmentService::new(data.clone()),
            kyc: KycService::new(data.clone(), config.backend.documents_bucket.clone()),
            invites: InviteService::new(data),
            backend,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
