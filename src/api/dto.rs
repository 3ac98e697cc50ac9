//! Data Transfer Objects
//!
//! Request and response types for the API endpoints and dashboard views.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::auth::Viewer;
use crate::models::{
    Bond, Holding, Invite, KycRequest, KycStatus, Profile, Referral, UserRecord,
};
use crate::services::{InvestmentEntry, PortfolioSummary, ReferralSummary};

// ============================================
// AUTH DTOs
// ============================================

/// Sign-up request
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    /// Role label, e.g. "Wealth Partner"
    pub role: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Current session
#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub viewer: Viewer,
    pub landing_path: &'static str,
}

// ============================================
// KYC DTOs
// ============================================

/// Query parameters of a document upload; the body is the raw file
#[derive(Debug, Deserialize)]
pub struct KycUploadParams {
    pub file_name: String,
    #[serde(default)]
    pub document_type: Option<String>,
}

// ============================================
// ADMIN HANDLER DTOs
// ============================================
//
// Fields are optional so that missing ones are reported together as one
// validation error instead of a deserialization failure.

/// Body of `POST /api/admin/investments/status`
#[derive(Debug, Default, Deserialize)]
pub struct InvestmentStatusUpdate {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Body of `POST /api/admin/kyc/status`
#[derive(Debug, Default, Deserialize)]
pub struct KycStatusUpdate {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Body of `POST /api/admin/referrals/status`
#[derive(Debug, Default, Deserialize)]
pub struct ReferralStatusUpdate {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub commission: Option<f64>,
}

/// Body of `POST /api/admin/invites`
#[derive(Debug, Default, Deserialize)]
pub struct InviteRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub invited_by: Option<String>,
}

/// Success body of the admin handlers
#[derive(Debug, Serialize)]
pub struct AdminResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> AdminResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

// ============================================
// VIEW DTOs
// ============================================

/// A rendered dashboard view
#[derive(Debug, Serialize)]
pub struct ViewResponse<T> {
    /// View identifier, e.g. "investor_overview"
    pub view: &'static str,
    pub viewer: Viewer,
    pub data: T,
    /// Shown instead of an error page when part of the data could not load
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Listing filters on admin views
#[derive(Debug, Default, Deserialize)]
pub struct ListFilter {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// `/dashboard/investor`
#[derive(Debug, Default, Serialize)]
pub struct InvestorOverview {
    pub portfolio: PortfolioSummary,
    pub recent_requests: Vec<InvestmentEntry>,
    pub holdings: Vec<Holding>,
    pub kyc_status: Option<KycStatus>,
    pub unread_notifications: usize,
}

/// `/dashboard/investor/investments` and `/dashboard/investor/icds`
#[derive(Debug, Default, Serialize)]
pub struct InvestmentsView {
    pub summary: PortfolioSummary,
    pub requests: Vec<InvestmentEntry>,
}

/// `/dashboard/investor/bonds`
#[derive(Debug, Default, Serialize)]
pub struct BondsView {
    pub bonds: Vec<Bond>,
    /// The investor's own bond requests
    pub requests: Vec<InvestmentEntry>,
}

/// `/dashboard/investor/kyc`
#[derive(Debug, Default, Serialize)]
pub struct KycView {
    pub latest: Option<KycRequest>,
}

/// Partner referral listing, also the body of `GET /api/v1/referrals`
#[derive(Debug, Default, Serialize)]
pub struct ReferralsView {
    pub summary: ReferralSummary,
    pub referrals: Vec<Referral>,
}

/// `/dashboard/admin`
#[derive(Debug, Default, Serialize)]
pub struct AdminOverview {
    pub pending_investments: usize,
    pub kyc_awaiting_review: usize,
    pub pending_referrals: usize,
    pub users: usize,
    /// Permission strings of the viewer's role
    pub permissions: Vec<&'static str>,
}

/// `/dashboard/admin/users`
#[derive(Debug, Default, Serialize)]
pub struct UsersView {
    pub users: Vec<UserRecord>,
    pub profiles: Vec<Profile>,
}

/// `/dashboard/admin/approvals`: everything waiting on a checker
#[derive(Debug, Default, Serialize)]
pub struct ApprovalsView {
    pub investments: Vec<InvestmentEntry>,
    pub kyc: Vec<KycRequest>,
    pub referrals: Vec<Referral>,
}

/// `/dashboard/admin/invites`
#[derive(Debug, Default, Serialize)]
pub struct InvitesView {
    pub invites: Vec<Invite>,
}

/// Login page
#[derive(Debug, Serialize)]
pub struct LoginView {
    pub view: &'static str,
    pub signup_roles: Vec<&'static str>,
    /// Demo sign-ins, listed only when running on the fixture backend
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub demo_accounts: Vec<&'static str>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "degraded"
    pub status: String,
    /// "remote" or "fixture"
    pub backend_mode: String,
    /// Backend status: "ok" or "error"
    pub backend: String,
    pub uptime_seconds: u64,
    pub version: String,
}
