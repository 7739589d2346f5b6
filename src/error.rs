//! Error types for the stores
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Store Error Enum ==
/// Unified error type for every store operation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backing store failed (disk, connection, client command)
    #[error("Backing store error: {0}")]
    Backend(String),

    /// Stored payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// First-use schema creation failed
    #[error("Schema initialization failed: {0}")]
    SchemaInit(String),

    /// A `/regex/flags` debounce matcher did not compile
    #[error("Invalid debounce pattern: {0}")]
    InvalidPattern(String),

    /// Invalid service configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Key absent or expired, on lookups that require it
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::InvalidPattern(_)
            | StoreError::Config(_)
            | StoreError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            StoreError::Backend(_) | StoreError::SchemaInit(_) | StoreError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_error_maps_to_backend() {
        let err: StoreError = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[test]
    fn test_status_codes() {
        let response = StoreError::Backend("down".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = StoreError::InvalidPattern("/(/".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = StoreError::NotFound("k".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
