//! Referral Routes
//!
//! - GET /api/v1/referrals - The partner's referrals and summary
//! - POST /api/v1/referrals - Refer a prospective investor

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::ReferralsView;
use crate::api::error::{ApiError, ApiResult};
use crate::api::session::CurrentUser;
use crate::api::state::AppState;
use crate::auth::Permission;
use crate::models::Referral;
use crate::services::{NewReferral, ReferralSummary};

/// GET /api/v1/referrals
pub async fn list_referrals(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<ReferralsView>> {
    user.require(Permission::ViewReferrals)?;
    let partner_email = partner_email(&user)?;

    let referrals = state.referrals.list_for_partner(partner_email).await?;
    Ok(Json(ReferralsView {
        summary: ReferralSummary::from_referrals(&referrals),
        referrals,
    }))
}

/// POST /api/v1/referrals
///
/// 409 with "This investor is already assigned to you" or "...to another
/// partner" when the investor was referred before.
pub async fn create_referral(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    body: Result<Json<NewReferral>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Referral>)> {
    user.require(Permission::CreateReferral)?;
    let Json(form) = body?;

    let referral = state.referrals.submit(partner_email(&user)?, form).await?;
    Ok((StatusCode::CREATED, Json(referral)))
}

fn partner_email(user: &CurrentUser) -> ApiResult<&str> {
    user.0
        .email
        .as_deref()
        .ok_or_else(|| ApiError::Validation("Your account has no email address".to_string()))
}
