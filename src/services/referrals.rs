//! Referrals
//!
//! A wealth partner refers a prospective investor by email. An investor email
//! may be held by one partner only. The check is query-then-insert and is not
//! atomic; a unique index on `referrals.investor_email` (enforced by the
//! fixture, expected on the hosted schema) closes the race, and a constraint
//! violation on insert is reported the same way as a lost pre-check.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use super::{is_valid_email, normalize_email};
use crate::backend::{records, DataError, DataSource, Filter, Query, Row, Table};
use crate::models::{Referral, ReferralStatus};

/// Referral form submitted by a partner
#[derive(Debug, Clone, Deserialize)]
pub struct NewReferral {
    pub investor_email: String,
    #[serde(default)]
    pub investor_name: Option<String>,
    #[serde(default)]
    pub investor_phone: Option<String>,
    /// Expected investment amount
    #[serde(default)]
    pub investment: Option<f64>,
}

#[derive(Error, Debug)]
pub enum ReferralError {
    #[error("Please enter a valid investor email")]
    InvalidEmail,

    #[error("Expected investment must be a positive amount")]
    InvalidInvestment,

    #[error("You cannot refer yourself")]
    SelfReferral,

    #[error("This investor is already assigned to you")]
    AlreadyAssignedToYou,

    #[error("This investor is already assigned to another partner")]
    AssignedToAnotherPartner,

    #[error("Referral {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Data(#[from] DataError),
}

/// Per-status counts and commission totals for a partner
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ReferralSummary {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub accepted: usize,
    pub rejected: usize,
    /// Expected investment across all non-rejected referrals
    pub pipeline_value: f64,
    /// Commission on approved and accepted referrals
    pub commission_earned: f64,
}

impl ReferralSummary {
    pub fn from_referrals(referrals: &[Referral]) -> Self {
        referrals.iter().fold(Self::default(), |mut acc, r| {
            acc.total += 1;
            match r.status {
                ReferralStatus::Pending => acc.pending += 1,
                ReferralStatus::Approved => acc.approved += 1,
                ReferralStatus::Accepted => acc.accepted += 1,
                ReferralStatus::Rejected => acc.rejected += 1,
            }
            if r.status != ReferralStatus::Rejected {
                acc.pipeline_value += r.investment.unwrap_or(0.0);
            }
            if r.status.earns_commission() {
                acc.commission_earned += r.commission.unwrap_or(0.0);
            }
            acc
        })
    }
}

/// Referral operations
#[derive(Clone)]
pub struct ReferralService {
    data: Arc<dyn DataSource>,
}

impl ReferralService {
    pub fn new(data: Arc<dyn DataSource>) -> Self {
        Self { data }
    }

    /// Submit a referral on behalf of `partner_email`.
    ///
    /// Rejects investors already referred by this partner or by another one;
    /// otherwise inserts exactly one `pending` row.
    pub async fn submit(
        &self,
        partner_email: &str,
        form: NewReferral,
    ) -> Result<Referral, ReferralError> {
        let partner_email = normalize_email(partner_email);
        let investor_email = normalize_email(&form.investor_email);

        if !is_valid_email(&investor_email) {
            return Err(ReferralError::InvalidEmail);
        }
        if investor_email == partner_email {
            return Err(ReferralError::SelfReferral);
        }
        if let Some(amount) = form.investment {
            if !amount.is_finite() || amount <= 0.0 {
                return Err(ReferralError::InvalidInvestment);
            }
        }

        let existing: Vec<Referral> = records::fetch_all(
            self.data.as_ref(),
            &Query::table(Table::Referrals).filter(Filter::or(vec![
                Filter::eq("investor_email", investor_email.as_str()),
                Filter::eq("partner_email", partner_email.as_str()),
            ])),
        )
        .await?;

        // Rows matched only through partner_email are this partner's other
        // referrals and do not block a new investor.
        if let Some(taken) = existing
            .iter()
            .find(|r| normalize_email(&r.investor_email) == investor_email)
        {
            return Err(if normalize_email(&taken.partner_email) == partner_email {
                ReferralError::AlreadyAssignedToYou
            } else {
                ReferralError::AssignedToAnotherPartner
            });
        }

        let referral = Referral {
            id: uuid::Uuid::new_v4().to_string(),
            partner_email: partner_email.clone(),
            investor_email,
            investor_name: form.investor_name.filter(|s| !s.trim().is_empty()),
            investor_phone: form.investor_phone.filter(|s| !s.trim().is_empty()),
            status: ReferralStatus::Pending,
            investment: form.investment,
            commission: None,
            created_at: Utc::now(),
        };

        match records::insert_record(self.data.as_ref(), Table::Referrals, &referral).await {
            Ok(stored) => {
                tracing::info!(
                    referral_id = %stored.id,
                    partner = %partner_email,
                    "Referral submitted"
                );
                Ok(stored)
            }
            Err(DataError::Conflict { .. }) => {
                tracing::warn!(partner = %partner_email, "Referral lost the race on investor email");
                Err(ReferralError::AssignedToAnotherPartner)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// A partner's referrals, newest first
    pub async fn list_for_partner(&self, partner_email: &str) -> Result<Vec<Referral>, ReferralError> {
        let query = Query::table(Table::Referrals)
            .eq("partner_email", normalize_email(partner_email))
            .order_desc("created_at");
        Ok(records::fetch_all(self.data.as_ref(), &query).await?)
    }

    /// All referrals, optionally by status, newest first
    pub async fn list(&self, status: Option<ReferralStatus>) -> Result<Vec<Referral>, ReferralError> {
        let mut query = Query::table(Table::Referrals).order_desc("created_at");
        if let Some(status) = status {
            query = query.eq("status", status.as_str());
        }
        Ok(records::fetch_all(self.data.as_ref(), &query).await?)
    }

    /// Write a new status (and optionally the commission) on a referral
    pub async fn update_status(
        &self,
        id: &str,
        status: ReferralStatus,
        commission: Option<f64>,
    ) -> Result<Referral, ReferralError> {
        let mut changes = Row::new();
        changes.insert("status".to_string(), Value::from(status.as_str()));
        if let Some(commission) = commission {
            changes.insert("commission".to_string(), Value::from(commission));
        }

        match records::update_record(self.data.as_ref(), Table::Referrals, id, changes).await {
            Ok(referral) => Ok(referral),
            Err(DataError::NotFound { .. }) => Err(ReferralError::NotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
