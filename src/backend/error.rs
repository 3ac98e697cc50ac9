//! Backend error types
//!
//! Errors raised by the data-source and auth-provider implementations.

use thiserror::Error;

/// Errors that can occur when talking to the backend
#[derive(Error, Debug)]
pub enum DataError {
    /// Backend could not be reached
    #[error("Backend unavailable")]
    Unavailable,

    /// Request exceeded the configured timeout
    #[error("Backend request timeout")]
    Timeout,

    /// Transport-level failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Backend error {status}: {message}")]
    Api { status: u16, message: String },

    /// A unique constraint rejected the write
    #[error("Conflict on {table}: {message}")]
    Conflict { table: String, message: String },

    /// Row addressed by id does not exist
    #[error("Row {id} not found in {table}")]
    NotFound { table: String, id: String },

    /// Row could not be converted to or from its typed form
    #[error("Decode error: {0}")]
    Decode(String),
}

impl DataError {
    /// Map a reqwest error onto the coarse transport categories
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            DataError::Timeout
        } else if e.is_connect() {
            DataError::Unavailable
        } else {
            DataError::Request(e)
        }
    }

    /// True when the backend itself could not be reached
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DataError::Unavailable | DataError::Timeout)
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Decode(err.to_string())
    }
}

/// Result type alias for backend operations
pub type DataResult<T> = Result<T, DataError>;

/// Errors raised by the auth provider
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with email {0} already exists")]
    EmailTaken(String),

    #[error("No active session")]
    Unauthenticated,

    #[error(transparent)]
    Backend(#[from] DataError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DataError::NotFound {
            table: "profiles".to_string(),
            id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Row abc not found in profiles");

        let err = DataError::Api {
            status: 400,
            message: "bad filter".to_string(),
        };
        assert_eq!(err.to_string(), "Backend error 400: bad filter");
    }

    #[test]
    fn test_unavailable_classification() {
        assert!(DataError::Timeout.is_unavailable());
        assert!(DataError::Unavailable.is_unavailable());
        assert!(!DataError::Decode("x".into()).is_unavailable());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: DataError = json_err.into();
        assert!(matches!(err, DataError::Decode(_)));
    }
}
