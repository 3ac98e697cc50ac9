//! Investment Requests
//!
//! Investors request ICD, bond or REIT placements; admins move the request
//! to any status. Each kind lives in its own table.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::backend::{records, DataError, DataSource, Query, Row, Table};
use crate::models::{Bond, Holding, InvestmentKind, InvestmentRequest, InvestmentStatus};

/// Investment request form
#[derive(Debug, Clone, Deserialize)]
pub struct NewInvestmentRequest {
    pub kind: InvestmentKind,
    pub amount: f64,
    /// Required for ICD and REIT; bond requests use the bond's coupon
    #[serde(default)]
    pub rate: Option<f64>,
    pub tenure_months: u32,
    /// Required for bond requests
    #[serde(default)]
    pub bond_id: Option<String>,
}

/// A request together with the product kind it belongs to
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InvestmentEntry {
    pub kind: InvestmentKind,
    #[serde(flatten)]
    pub request: InvestmentRequest,
}

/// Portfolio totals over an investor's requests
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PortfolioSummary {
    /// Principal in active requests
    pub total_invested: f64,
    /// Simple-interest return on active requests
    pub expected_returns: f64,
    pub active: usize,
    pub pending: usize,
    pub matured: usize,
    /// Active principal per product kind
    pub by_kind: HashMap<InvestmentKind, f64>,
}

impl PortfolioSummary {
    pub fn from_entries(entries: &[InvestmentEntry]) -> Self {
        let mut summary = Self::default();
        for entry in entries {
            match entry.request.status {
                InvestmentStatus::Active => {
                    summary.active += 1;
                    summary.total_invested += entry.request.amount;
                    summary.expected_returns += entry.request.expected_return();
                    *summary.by_kind.entry(entry.kind).or_insert(0.0) += entry.request.amount;
                }
                InvestmentStatus::Pending => summary.pending += 1,
                InvestmentStatus::Matured => summary.matured += 1,
                InvestmentStatus::Rejected | InvestmentStatus::Withdrawn => {}
            }
        }
        summary
    }
}

#[derive(Error, Debug)]
pub enum InvestmentError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bond {0} not found")]
    UnknownBond(String),

    #[error("{kind} request {id} not found")]
    NotFound { kind: InvestmentKind, id: String },

    #[error(transparent)]
    Data(#[from] DataError),
}

/// Investment request operations
#[derive(Clone)]
pub struct InvestmentService {
    data: Arc<dyn DataSource>,
}

impl InvestmentService {
    pub fn new(data: Arc<dyn DataSource>) -> Self {
        Self { data }
    }

    /// File a new request in `Pending`
    pub async fn create(
        &self,
        investor_id: &str,
        investor_email: Option<String>,
        form: NewInvestmentRequest,
    ) -> Result<InvestmentEntry, InvestmentError> {
        validate_amount_and_tenure(&form)?;

        let (rate, bond_id) = match form.kind {
            InvestmentKind::Bond => {
                let bond_id = form.bond_id.clone().ok_or_else(|| {
                    InvestmentError::Validation("Bond requests must name a bond".to_string())
                })?;
                let bond: Bond = records::fetch_one(self.data.as_ref(), Table::Bonds, &bond_id)
                    .await?
                    .ok_or_else(|| InvestmentError::UnknownBond(bond_id.clone()))?;
                if form.amount < bond.min_investment {
                    return Err(InvestmentError::Validation(format!(
                        "Minimum investment for {} is {:.2}",
                        bond.name, bond.min_investment
                    )));
                }
                (bond.coupon_rate, Some(bond_id))
            }
            InvestmentKind::Icd | InvestmentKind::Reit => {
                let rate = form.rate.ok_or_else(|| {
                    InvestmentError::Validation("Rate is required".to_string())
                })?;
                if !rate.is_finite() || rate <= 0.0 || rate > 100.0 {
                    return Err(InvestmentError::Validation(
                        "Rate must be between 0 and 100 percent".to_string(),
                    ));
                }
                (rate, None)
            }
        };

        let request = InvestmentRequest {
            id: uuid::Uuid::new_v4().to_string(),
            investor_id: investor_id.to_string(),
            investor_email,
            amount: form.amount,
            rate,
            tenure_months: form.tenure_months,
            status: InvestmentStatus::Pending,
            bond_id,
            created_at: Utc::now(),
        };

        let stored = records::insert_record(self.data.as_ref(), form.kind.table(), &request).await?;
        tracing::info!(
            request_id = %stored.id,
            kind = %form.kind,
            amount = stored.amount,
            "Investment request created"
        );

        Ok(InvestmentEntry {
            kind: form.kind,
            request: stored,
        })
    }

    /// All of an investor's requests across kinds, newest first
    pub async fn list_for_investor(
        &self,
        investor_id: &str,
    ) -> Result<Vec<InvestmentEntry>, InvestmentError> {
        let mut entries = Vec::new();
        for kind in InvestmentKind::all() {
            let query = Query::table(kind.table()).eq("investor_id", investor_id);
            entries.extend(self.fetch_kind(*kind, &query).await?);
        }
        entries.sort_by(|a, b| b.request.created_at.cmp(&a.request.created_at));
        Ok(entries)
    }

    /// Requests of one or all kinds, optionally by status, newest first
    pub async fn list(
        &self,
        kind: Option<InvestmentKind>,
        status: Option<InvestmentStatus>,
    ) -> Result<Vec<InvestmentEntry>, InvestmentError> {
        let kinds: Vec<InvestmentKind> = match kind {
            Some(kind) => vec![kind],
            None => InvestmentKind::all().to_vec(),
        };

        let mut entries = Vec::new();
        for kind in kinds {
            let mut query = Query::table(kind.table());
            if let Some(status) = status {
                query = query.eq("status", status.as_str());
            }
            entries.extend(self.fetch_kind(kind, &query).await?);
        }
        entries.sort_by(|a, b| b.request.created_at.cmp(&a.request.created_at));
        Ok(entries)
    }

    /// Write a new status on a request; any status may follow any other
    pub async fn update_status(
        &self,
        kind: InvestmentKind,
        id: &str,
        status: InvestmentStatus,
    ) -> Result<InvestmentEntry, InvestmentError> {
        let mut changes = Row::new();
        changes.insert("status".to_string(), Value::from(status.as_str()));

        match records::update_record(self.data.as_ref(), kind.table(), id, changes).await {
            Ok(request) => Ok(InvestmentEntry { kind, request }),
            Err(DataError::NotFound { .. }) => Err(InvestmentError::NotFound {
                kind,
                id: id.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Bonds on offer, nearest maturity first
    pub async fn list_bonds(&self) -> Result<Vec<Bond>, InvestmentError> {
        let query = Query::table(Table::Bonds).order_asc("maturity_date");
        Ok(records::fetch_all(self.data.as_ref(), &query).await?)
    }

    /// Holdings of an investor
    pub async fn holdings(&self, investor_id: &str) -> Result<Vec<Holding>, InvestmentError> {
        let query = Query::table(Table::Investments)
            .eq("investor_id", investor_id)
            .order_desc("started_on");
        Ok(records::fetch_all(self.data.as_ref(), &query).await?)
    }

    async fn fetch_kind(
        &self,
        kind: InvestmentKind,
        query: &Query,
    ) -> Result<Vec<InvestmentEntry>, InvestmentError> {
        let requests: Vec<InvestmentRequest> = records::fetch_all(self.data.as_ref(), query).await?;
        Ok(requests
            .into_iter()
            .map(|request| InvestmentEntry { kind, request })
            .collect())
    }
}

fn validate_amount_and_tenure(form: &NewInvestmentRequest) -> Result<(), InvestmentError> {
    if !form.amount.is_finite() || form.amount <= 0.0 {
        return Err(InvestmentError::Validation(
            "Amount must be a positive number".to_string(),
        ));
    }
    if form.tenure_months == 0 {
        return Err(InvestmentError::Validation(
            "Tenure must be at least one month".to_string(),
        ));
    }
    if form.tenure_months > 360 {
        return Err(InvestmentError::Validation(
            "Tenure exceeds maximum of 360 months".to_string(),
        ));
    }
    Ok(())
}
