//! Sessions
//!
//! The session token travels either as `Authorization: Bearer <token>` or in
//! the `wd-access-token` cookie set at login. Two consumers:
//!
//! - [`view_guard`]: middleware in front of the dashboard views. Runs the
//!   route guard on every request and redirects instead of failing.
//! - [`CurrentUser`]: extractor for the JSON API. Fails with 401/403.

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::auth::{guard_view, load_profile, resolve_session, AccessDecision, Permission, Viewer};

pub const SESSION_COOKIE: &str = "wd-access-token";

/// Session token from the request headers, bearer first
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value carrying a fresh session
pub fn session_cookie(token: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, token
    ))
    .ok()
}

/// `Set-Cookie` value that clears the session
pub fn cleared_session_cookie() -> HeaderValue {
    HeaderValue::from_static("wd-access-token=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}

/// Route guard for dashboard views.
///
/// Renders by passing the [`Viewer`] on as a request extension; every other
/// outcome is a redirect.
pub async fn view_guard(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = session_token(request.headers());
    let path = request.uri().path().to_string();

    let decision = guard_view(
        state.backend.auth.as_ref(),
        state.backend.data.as_ref(),
        token.as_deref(),
        &path,
    )
    .await;

    match decision {
        AccessDecision::Render(viewer) => {
            request.extensions_mut().insert(viewer);
            next.run(request).await
        }
        AccessDecision::Redirect(target) => Redirect::to(target).into_response(),
    }
}

/// The signed-in user behind an API request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Viewer);

impl CurrentUser {
    /// Fail with 403 unless the user's role grants `permission`
    pub fn require(&self, permission: Permission) -> Result<(), ApiError> {
        if self.0.role.has_permission(permission) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "Role {} lacks permission {}",
                self.0.role, permission
            )))
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers);
        let user = resolve_session(state.backend.auth.as_ref(), token.as_deref())
            .await
            .ok_or_else(|| ApiError::Unauthorized("Sign in to continue".to_string()))?;

        let profile = load_profile(state.backend.data.as_ref(), &user.id)
            .await
            .ok_or_else(|| ApiError::Forbidden("No role is assigned to this account".to_string()))?;

        Ok(CurrentUser(Viewer {
            user_id: user.id,
            email: profile.email.or(user.email),
            full_name: profile.full_name,
            role: profile.role,
        }))
    }
}
