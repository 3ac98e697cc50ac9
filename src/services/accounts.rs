//! Accounts
//!
//! Registration creates the auth account and the profile row carrying the
//! role, then reads the profile back. The hosted backend may not serve the
//! new row immediately, so the read is retried a fixed number of times with
//! a fixed pause.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::{is_valid_email, normalize_email};
use crate::auth::{landing_path_for, Role};
use crate::backend::{records, AuthError, AuthProvider, DataError, DataSource, Table};
use crate::config::RegistrationConfig;
use crate::models::Profile;

const MIN_PASSWORD_LEN: usize = 6;

/// Sign-up form
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub role: Role,
}

/// Result of a successful registration or login
#[derive(Debug, Clone, Serialize)]
pub struct SignedIn {
    /// Present when the backend issued a session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    pub profile: Profile,
    pub landing_path: &'static str,
}

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password must be at least 6 characters")]
    WeakPassword,

    #[error("Profile for user {0} not found")]
    ProfileMissing(String),

    #[error("Profile for user {user_id} not readable after {attempts} attempts")]
    ProfileNotReady { user_id: String, attempts: u32 },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Data(#[from] DataError),
}

/// Registration and login
#[derive(Clone)]
pub struct AccountService {
    data: Arc<dyn DataSource>,
    auth: Arc<dyn AuthProvider>,
    config: RegistrationConfig,
}

impl AccountService {
    pub fn new(
        data: Arc<dyn DataSource>,
        auth: Arc<dyn AuthProvider>,
        config: RegistrationConfig,
    ) -> Self {
        Self { data, auth, config }
    }

    /// Create the account and its profile
    pub async fn register(&self, form: Registration) -> Result<SignedIn, AccountError> {
        let email = normalize_email(&form.email);
        if !is_valid_email(&email) {
            return Err(AccountError::InvalidEmail);
        }
        if form.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountError::WeakPassword);
        }

        let user = self.auth.sign_up(&email, &form.password).await?;

        let profile = Profile {
            id: user.id.clone(),
            email: Some(email.clone()),
            full_name: form.full_name.filter(|n| !n.trim().is_empty()),
            role: form.role,
            created_at: Utc::now(),
        };
        records::insert_record(self.data.as_ref(), Table::Profiles, &profile).await?;

        let profile = self.fetch_profile_with_retry(&user.id).await?;
        tracing::info!(user_id = %profile.id, role = %profile.role, "Account registered");

        Ok(SignedIn {
            access_token: None,
            landing_path: landing_path_for(profile.role),
            profile,
        })
    }

    /// Exchange credentials for a session and the user's profile
    pub async fn login(&self, email: &str, password: &str) -> Result<SignedIn, AccountError> {
        let session = self.auth.sign_in(&normalize_email(email), password).await?;

        let profile: Profile =
            records::fetch_one(self.data.as_ref(), Table::Profiles, &session.user.id)
                .await?
                .ok_or_else(|| AccountError::ProfileMissing(session.user.id.clone()))?;

        tracing::info!(user_id = %profile.id, role = %profile.role, "User signed in");

        Ok(SignedIn {
            access_token: Some(session.access_token),
            landing_path: landing_path_for(profile.role),
            profile,
        })
    }

    /// Read a just-written profile, retrying on misses and errors
    async fn fetch_profile_with_retry(&self, user_id: &str) -> Result<Profile, AccountError> {
        let attempts = self.config.profile_fetch_attempts.max(1);
        let delay = Duration::from_millis(self.config.profile_fetch_delay_ms);

        for attempt in 1..=attempts {
            match records::fetch_one::<Profile>(self.data.as_ref(), Table::Profiles, user_id).await
            {
                Ok(Some(profile)) => return Ok(profile),
                Ok(None) => {
                    tracing::debug!(user_id = %user_id, attempt, "Profile not visible yet");
                }
                Err(e) => {
                    tracing::warn!(user_id = %user_id, attempt, error = %e, "Profile read failed");
                }
            }

            if attempt < attempts {
                tokio::time::sleep(delay).await;
            }
        }

        Err(AccountError::ProfileNotReady {
            user_id: user_id.to_string(),
            attempts,
        })
    }
}
