//! Investment Routes
//!
//! - GET /api/v1/investments - The investor's own requests
//! - POST /api/v1/investments - File an ICD, bond or REIT request
//! - GET /api/v1/bonds - Bonds on offer

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::InvestmentsView;
use crate::api::error::ApiResult;
use crate::api::session::CurrentUser;
use crate::api::state::AppState;
use crate::auth::Permission;
use crate::models::Bond;
use crate::services::{InvestmentEntry, NewInvestmentRequest, PortfolioSummary};

/// GET /api/v1/investments
pub async fn list_investments(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<InvestmentsView>> {
    user.require(Permission::ViewInvestments)?;

    let requests = state.investments.list_for_investor(&user.0.user_id).await?;
    Ok(Json(InvestmentsView {
        summary: PortfolioSummary::from_entries(&requests),
        requests,
    }))
}

/// POST /api/v1/investments
pub async fn create_investment(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    body: Result<Json<NewInvestmentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<InvestmentEntry>)> {
    user.require(Permission::CreateInvestmentRequest)?;
    let Json(form) = body?;

    let CurrentUser(viewer) = user;
    let entry = state
        .investments
        .create(&viewer.user_id, viewer.email, form)
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/v1/bonds
pub async fn list_bonds(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<Bond>>> {
    user.require(Permission::ViewBonds)?;
    Ok(Json(state.investments.list_bonds().await?))
}
