//! Invites
//!
//! Admin makers invite prospective users by email with a role.

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

use super::{is_valid_email, normalize_email};
use crate::auth::Role;
use crate::backend::{records, DataError, DataSource, Query, Table};
use crate::models::{Invite, InviteStatus};

#[derive(Error, Debug)]
pub enum InviteError {
    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("{0} already has a pending invite")]
    AlreadyInvited(String),

    #[error(transparent)]
    Data(#[from] DataError),
}

#[derive(Clone)]
pub struct InviteService {
    data: Arc<dyn DataSource>,
}

impl InviteService {
    pub fn new(data: Arc<dyn DataSource>) -> Self {
        Self { data }
    }

    pub async fn create(
        &self,
        email: &str,
        role: Role,
        invited_by: Option<String>,
    ) -> Result<Invite, InviteError> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(InviteError::InvalidEmail);
        }

        let pending: Vec<Invite> = records::fetch_all(
            self.data.as_ref(),
            &Query::table(Table::Invites)
                .eq("email", email.as_str())
                .eq("status", "pending")
                .limit(1),
        )
        .await?;
        if !pending.is_empty() {
            return Err(InviteError::AlreadyInvited(email));
        }

        let invite = Invite {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            role,
            token: uuid::Uuid::new_v4().simple().to_string(),
            invited_by,
            status: InviteStatus::Pending,
            created_at: Utc::now(),
        };

        let stored = records::insert_record(self.data.as_ref(), Table::Invites, &invite).await?;
        tracing::info!(invite_id = %stored.id, role = %stored.role, "Invite created");
        Ok(stored)
    }

    /// All invites, newest first
    pub async fn list(&self) -> Result<Vec<Invite>, InviteError> {
        let query = Query::table(Table::Invites).order_desc("created_at");
        Ok(records::fetch_all(self.data.as_ref(), &query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FixtureBackend;

    #[tokio::test]
    async fn test_create_invite() {
        let service = InviteService::new(Arc::new(FixtureBackend::empty()));

        let invite = service
            .create("New.Partner@Example.com", Role::WealthPartner, Some("maker-1".into()))
            .await
            .unwrap();
        assert_eq!(invite.email, "new.partner@example.com");
        assert_eq!(invite.status, InviteStatus::Pending);
        assert_eq!(invite.token.len(), 32);

        assert!(matches!(
            service
                .create("new.partner@example.com", Role::Investor, None)
                .await,
            Err(InviteError::AlreadyInvited(_))
        ));

        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_email() {
        let service = InviteService::new(Arc::new(FixtureBackend::empty()));
        assert!(matches!(
            service.create("nope", Role::Investor, None).await,
            Err(InviteError::InvalidEmail)
        ));
    }
}
