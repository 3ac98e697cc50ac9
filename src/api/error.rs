//! API Error Types
//!
//! Every handler failure becomes one JSON envelope:
//! `{"error": {"code", "message"}, "request_id"}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::backend::{AuthError, DataError};
use crate::services::{AccountError, InvestmentError, InviteError, KycError, ReferralError};

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("{0}")]
    Validation(String),

    /// No usable session
    #[error("{0}")]
    Unauthorized(String),

    /// Role lacks the permission
    #[error("{0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Write rejected because of an existing row
    #[error("{0}")]
    Conflict(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Backend call failed
    #[error("Backend error: {0}")]
    Backend(#[from] DataError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED"),
            ApiError::Backend(e) if e.is_unavailable() => {
                (StatusCode::SERVICE_UNAVAILABLE, "BACKEND_UNAVAILABLE")
            }
            ApiError::Backend(_) => (StatusCode::INTERNAL_SERVER_ERROR, "BACKEND_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::debug!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => ApiError::Unauthorized(e.to_string()),
            AuthError::Unauthenticated => ApiError::Unauthorized(e.to_string()),
            AuthError::EmailTaken(_) => ApiError::Conflict(e.to_string()),
            AuthError::Backend(e) => ApiError::Backend(e),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::InvalidEmail | AccountError::WeakPassword => {
                ApiError::Validation(e.to_string())
            }
            AccountError::ProfileMissing(_) => {
                ApiError::Forbidden("No role is assigned to this account".to_string())
            }
            AccountError::ProfileNotReady { .. } => ApiError::Internal(e.to_string()),
            AccountError::Auth(e) => e.into(),
            AccountError::Data(e) => ApiError::Backend(e),
        }
    }
}

impl From<ReferralError> for ApiError {
    fn from(e: ReferralError) -> Self {
        match e {
            ReferralError::InvalidEmail
            | ReferralError::InvalidInvestment
            | ReferralError::SelfReferral => ApiError::Validation(e.to_string()),
            ReferralError::AlreadyAssignedToYou | ReferralError::AssignedToAnotherPartner => {
                ApiError::Conflict(e.to_string())
            }
            ReferralError::NotFound(_) => ApiError::NotFound(e.to_string()),
            ReferralError::Data(e) => ApiError::Backend(e),
        }
    }
}

impl From<InvestmentError> for ApiError {
    fn from(e: InvestmentError) -> Self {
        match e {
            InvestmentError::Validation(msg) => ApiError::Validation(msg),
            InvestmentError::UnknownBond(_) => ApiError::Validation(e.to_string()),
            InvestmentError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            InvestmentError::Data(e) => ApiError::Backend(e),
        }
    }
}

impl From<KycError> for ApiError {
    fn from(e: KycError) -> Self {
        match e {
            KycError::Validation(msg) => ApiError::Validation(msg),
            KycError::NotFound(_) => ApiError::NotFound(e.to_string()),
            KycError::Data(e) => ApiError::Backend(e),
        }
    }
}

impl From<InviteError> for ApiError {
    fn from(e: InviteError) -> Self {
        match e {
            InviteError::InvalidEmail => ApiError::Validation(e.to_string()),
            InviteError::AlreadyInvited(_) => ApiError::Conflict(e.to_string()),
            InviteError::Data(e) => ApiError::Backend(e),
        }
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: ApiError) -> StatusCode {
        e.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(ApiError::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(ApiError::MethodNotAllowed), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            status_of(ApiError::Backend(DataError::Unavailable)),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(ReferralError::AssignedToAnotherPartner.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AccountError::Auth(AuthError::InvalidCredentials).into()),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_referral_message_is_kept() {
        let e: ApiError = ReferralError::AlreadyAssignedToYou.into();
        assert_eq!(e.to_string(), "This investor is already assigned to you");
    }
}
