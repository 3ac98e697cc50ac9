//! Domain Rows
//!
//! Typed forms of the rows the application reads and writes:
//! - `Profile`: role assignment per user
//! - `Referral`: partner → prospective investor link
//! - `InvestmentRequest`: ICD, bond and REIT requests
//! - `KycRequest`: identity verification state
//! - `Bond`, `Holding`, `UserRecord`, `Notification`, `Invite`: listings
//!
//! Statuses are plain enums. Any status may be written over any other; no
//! transition rules are enforced here.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::auth::Role;
use crate::backend::Table;

/// Case-insensitive parse over a fixed set of variants
macro_rules! string_enum {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub fn all() -> &'static [$ty] {
                &[$($ty::$variant),+]
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ty::all()
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| {
                        let names: Vec<&str> = $ty::all().iter().map(|v| v.as_str()).collect();
                        format!("Invalid value: {}. Use one of {}", s, names.join(", "))
                    })
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// ============================================
// PROFILES
// ============================================

/// Role assignment for an authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Row of the `users` directory table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ============================================
// REFERRALS
// ============================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
    Pending,
    Approved,
    Rejected,
    Accepted,
}

string_enum!(ReferralStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    Accepted => "accepted",
});

impl ReferralStatus {
    /// Statuses that earn the partner a commission
    pub fn earns_commission(&self) -> bool {
        matches!(self, ReferralStatus::Approved | ReferralStatus::Accepted)
    }
}

/// A wealth partner's referral of a prospective investor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Referral {
    pub id: String,
    pub partner_email: String,
    pub investor_email: String,
    #[serde(default)]
    pub investor_name: Option<String>,
    #[serde(default)]
    pub investor_phone: Option<String>,
    pub status: ReferralStatus,
    #[serde(default)]
    pub investment: Option<f64>,
    #[serde(default)]
    pub commission: Option<f64>,
    pub created_at: DateTime<Utc>,
}

// ============================================
// INVESTMENTS
// ============================================

/// Product an investment request is for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentKind {
    Icd,
    Bond,
    Reit,
}

string_enum!(InvestmentKind {
    Icd => "icd",
    Bond => "bond",
    Reit => "reit",
});

impl InvestmentKind {
    /// Table the requests of this kind live in
    pub fn table(&self) -> Table {
        match self {
            InvestmentKind::Icd => Table::Icds,
            InvestmentKind::Bond => Table::BondRequests,
            InvestmentKind::Reit => Table::ReitRequests,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum InvestmentStatus {
    Pending,
    Active,
    Rejected,
    Matured,
    Withdrawn,
}

string_enum!(InvestmentStatus {
    Pending => "Pending",
    Active => "Active",
    Rejected => "Rejected",
    Matured => "Matured",
    Withdrawn => "Withdrawn",
});

/// An investor's request to place money in an ICD, bond or REIT
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvestmentRequest {
    pub id: String,
    pub investor_id: String,
    #[serde(default)]
    pub investor_email: Option<String>,
    pub amount: f64,
    /// Annual rate in percent
    pub rate: f64,
    pub tenure_months: u32,
    pub status: InvestmentStatus,
    /// Set on bond requests
    #[serde(default)]
    pub bond_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl InvestmentRequest {
    /// Simple-interest return over the full tenure
    pub fn expected_return(&self) -> f64 {
        self.amount * (self.rate / 100.0) * (self.tenure_months as f64 / 12.0)
    }
}

/// Row of the `investments` holdings table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    pub id: String,
    pub investor_id: String,
    pub product: String,
    pub amount: f64,
    pub current_value: f64,
    pub started_on: NaiveDate,
}

/// Bond on offer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bond {
    pub id: String,
    pub name: String,
    pub issuer: String,
    /// Annual coupon in percent
    pub coupon_rate: f64,
    pub maturity_date: NaiveDate,
    pub min_investment: f64,
    #[serde(default)]
    pub rating: Option<String>,
}

// ============================================
// KYC
// ============================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum KycStatus {
    Pending,
    Submitted,
    Approved,
    Rejected,
}

string_enum!(KycStatus {
    Pending => "Pending",
    Submitted => "Submitted",
    Approved => "Approved",
    Rejected => "Rejected",
});

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KycRequest {
    pub id: String,
    pub user_id: String,
    pub status: KycStatus,
    /// Storage key of the uploaded document
    #[serde(default)]
    pub document_path: Option<String>,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================
// NOTIFICATIONS & INVITES
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub message: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Expired,
}

/// Invitation to join with a given role
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invite {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub token: String,
    #[serde(default)]
    pub invited_by: Option<String>,
    pub status: InviteStatus,
    pub created_at: DateTime<Utc>,
}
