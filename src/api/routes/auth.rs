//! Auth Routes
//!
//! - POST /api/v1/auth/signup - Create an account with a role
//! - POST /api/v1/auth/login - Sign in; sets the session cookie
//! - POST /api/v1/auth/logout - Clear the session cookie
//! - GET /api/v1/auth/me - Current user and landing path

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{LoginRequest, MeResponse, SignupRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::session::{cleared_session_cookie, session_cookie, CurrentUser};
use crate::api::state::AppState;
use crate::auth::{landing_path_for, Role};
use crate::services::{Registration, SignedIn};

/// POST /api/v1/auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SignedIn>)> {
    let Json(req) = body?;
    let role: Role = req.role.parse().map_err(ApiError::Validation)?;

    let signed_in = state
        .accounts
        .register(Registration {
            email: req.email,
            password: req.password,
            full_name: req.full_name,
            role,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(signed_in)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(req) = body?;
    let signed_in = state.accounts.login(&req.email, &req.password).await?;

    let cookie = signed_in.access_token.as_deref().and_then(session_cookie);
    let mut response = Json(signed_in).into_response();
    if let Some(cookie) = cookie {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    Ok(response)
}

/// POST /api/v1/auth/logout
pub async fn logout() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, cleared_session_cookie())],
    )
}

/// GET /api/v1/auth/me
pub async fn me(CurrentUser(viewer): CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        landing_path: landing_path_for(viewer.role),
        viewer,
    })
}
