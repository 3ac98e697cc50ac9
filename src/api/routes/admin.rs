//! Internal Admin Handlers
//!
//! POST-only mutation endpoints used by the admin dashboard. The caller's
//! role arrives in the `x-user-role` header and is checked against the
//! permission table; request bodies get presence checks only.
//!
//! - POST /api/admin/investments/status - `{kind, id, status}`
//! - POST /api/admin/kyc/status - `{id, status, remarks?}`
//! - POST /api/admin/referrals/status - `{id, status, commission?}`
//! - POST /api/admin/invites - `{email, role, invited_by?}`
//!
//! Any other method answers 405. Every answer is one of 200, 400, 403, 405
//! or 500: lookup misses and duplicates are 400, backend failures 500.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{
    AdminResponse, InvestmentStatusUpdate, InviteRequest, KycStatusUpdate, ReferralStatusUpdate,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::auth::{role_has_permission, Permission, Role};
use crate::models::{InvestmentKind, InvestmentStatus, Invite, KycRequest, KycStatus, Referral, ReferralStatus};
use crate::services::InvestmentEntry;

pub const ROLE_HEADER: &str = "x-user-role";

/// POST /api/admin/investments/status
pub async fn update_investment_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<InvestmentStatusUpdate>, JsonRejection>,
) -> ApiResult<Json<AdminResponse<InvestmentEntry>>> {
    require_role_permission(&headers, Permission::UpdateInvestmentStatus)?;
    let Json(req) = body?;
    let (kind, id, status) = match (req.kind, req.id, req.status) {
        (Some(kind), Some(id), Some(status)) => (kind, id, status),
        (kind, id, status) => {
            return Err(missing(&[
                ("kind", kind.is_none()),
                ("id", id.is_none()),
                ("status", status.is_none()),
            ]))
        }
    };

    let kind: InvestmentKind = kind.parse().map_err(ApiError::Validation)?;
    let status: InvestmentStatus = status.parse().map_err(ApiError::Validation)?;

    let entry = state
        .investments
        .update_status(kind, &id, status)
        .await
        .map_err(admin_error)?;
    tracing::info!(kind = %kind, id = %id, status = %status, "Investment status updated");
    Ok(Json(AdminResponse::ok(entry)))
}

/// POST /api/admin/kyc/status
pub async fn update_kyc_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<KycStatusUpdate>, JsonRejection>,
) -> ApiResult<Json<AdminResponse<KycRequest>>> {
    require_role_permission(&headers, Permission::UpdateKycStatus)?;
    let Json(req) = body?;
    let (id, status) = match (req.id, req.status) {
        (Some(id), Some(status)) => (id, status),
        (id, status) => {
            return Err(missing(&[("id", id.is_none()), ("status", status.is_none())]))
        }
    };

    let status: KycStatus = status.parse().map_err(ApiError::Validation)?;

    let request = state
        .kyc
        .update_status(&id, status, req.remarks)
        .await
        .map_err(admin_error)?;
    tracing::info!(id = %id, status = %status, "KYC status updated");
    Ok(Json(AdminResponse::ok(request)))
}

/// POST /api/admin/referrals/status
pub async fn update_referral_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<ReferralStatusUpdate>, JsonRejection>,
) -> ApiResult<Json<AdminResponse<Referral>>> {
    require_role_permission(&headers, Permission::UpdateReferralStatus)?;
    let Json(req) = body?;
    let (id, status) = match (req.id, req.status) {
        (Some(id), Some(status)) => (id, status),
        (id, status) => {
            return Err(missing(&[("id", id.is_none()), ("status", status.is_none())]))
        }
    };

    let status: ReferralStatus = status.parse().map_err(ApiError::Validation)?;

    let referral = state
        .referrals
        .update_status(&id, status, req.commission)
        .await
        .map_err(admin_error)?;
    tracing::info!(id = %id, status = %status, "Referral status updated");
    Ok(Json(AdminResponse::ok(referral)))
}

/// POST /api/admin/invites
pub async fn create_invite(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<InviteRequest>, JsonRejection>,
) -> ApiResult<Json<AdminResponse<Invite>>> {
    require_role_permission(&headers, Permission::CreateInvite)?;
    let Json(req) = body?;
    let (email, role) = match (req.email, req.role) {
        (Some(email), Some(role)) => (email, role),
        (email, role) => {
            return Err(missing(&[("email", email.is_none()), ("role", role.is_none())]))
        }
    };

    let role: Role = role.parse().map_err(ApiError::Validation)?;

    let invite = state
        .invites
        .create(&email, role, req.invited_by)
        .await
        .map_err(admin_error)?;
    Ok(Json(AdminResponse::ok(invite)))
}

/// Fallback for every non-POST method on the admin handlers
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn require_role_permission(headers: &HeaderMap, permission: Permission) -> ApiResult<()> {
    let role = headers
        .get(ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if role_has_permission(role, permission) {
        Ok(())
    } else {
        tracing::debug!(role = %role, permission = %permission, "Admin handler denied");
        Err(ApiError::Forbidden(format!(
            "Permission {} required",
            permission
        )))
    }
}

/// Narrow a service failure to the admin handlers' status set
fn admin_error(e: impl Into<ApiError>) -> ApiError {
    match e.into() {
        ApiError::NotFound(msg) | ApiError::Conflict(msg) => ApiError::Validation(msg),
        ApiError::Unauthorized(msg) => ApiError::Forbidden(msg),
        ApiError::Backend(e) => ApiError::Internal(e.to_string()),
        other => other,
    }
}

fn missing(fields: &[(&str, bool)]) -> ApiError {
    let names: Vec<&str> = fields
        .iter()
        .filter(|(_, absent)| *absent)
        .map(|(name, _)| *name)
        .collect();
    ApiError::Validation(format!("Missing required fields: {}", names.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DataError;
    use crate::services::{InviteError, KycError};
    use axum::{http::HeaderValue, response::IntoResponse};

    #[test]
    fn test_missing_lists_absent_fields() {
        let e = missing(&[("kind", false), ("id", true), ("status", true)]);
        assert_eq!(e.to_string(), "Missing required fields: id, status");
    }

    #[test]
    fn test_role_header_permission() {
        let mut headers = HeaderMap::new();
        assert!(require_role_permission(&headers, Permission::UpdateKycStatus).is_err());

        headers.insert(ROLE_HEADER, HeaderValue::from_static("Admin Maker"));
        assert!(require_role_permission(&headers, Permission::UpdateKycStatus).is_err());
        assert!(require_role_permission(&headers, Permission::CreateInvite).is_ok());

        headers.insert(ROLE_HEADER, HeaderValue::from_static("Admin Checker"));
        assert!(require_role_permission(&headers, Permission::UpdateKycStatus).is_ok());
    }

    #[test]
    fn test_admin_error_stays_in_status_set() {
        let status = |e: ApiError| e.into_response().status().as_u16();

        assert_eq!(status(admin_error(KycError::NotFound("kyc-9".into()))), 400);
        assert_eq!(
            status(admin_error(InviteError::AlreadyInvited("a@example.com".into()))),
            400
        );
        assert_eq!(status(admin_error(KycError::Data(DataError::Unavailable))), 500);
        assert_eq!(status(admin_error(ApiError::Validation("x".into()))), 400);
    }
}
