//! Error types for the document cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the document cache.
///
/// Absence is not an error inside the repository: reads return `Ok(None)`.
/// `NotFound` only exists so the HTTP layer can answer 404.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key not found (HTTP boundary only)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Stored record cannot be materialized as the requested type
    #[error("Decode failure: {0}")]
    DecodeFailure(String),

    /// The document store could not be reached or timed out
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The document store rejected the write with a revision conflict
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Key, sub-key or type name is not encodable as a document id
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A document could not be serialized for storage
    #[error("Encode failure: {0}")]
    EncodeFailure(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::DecodeFailure(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CacheError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Conflict(_) => StatusCode::CONFLICT,
            CacheError::InvalidKey(_) => StatusCode::BAD_REQUEST,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::EncodeFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the document cache.
pub type Result<T> = std::result::Result<T, CacheError>;
