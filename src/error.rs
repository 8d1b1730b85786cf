//! Error types for the cache and its HTTP gateway
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the crate.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Configuration rejected at load time (e.g. zero default TTL)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Fetch failed and nothing was cached to fall back on
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == Fetch Error ==
/// Failure reported by a fetcher.
///
/// Cloneable so a single shared fetch can hand the same failure to every
/// binding attached to it.
#[derive(Error, Debug, Clone)]
#[error("fetch failed for '{key}': {cause:#}")]
pub struct FetchError {
    key: String,
    cause: Arc<anyhow::Error>,
}

impl FetchError {
    pub fn new(key: impl Into<String>, cause: anyhow::Error) -> Self {
        Self {
            key: key.into(),
            cause: Arc::new(cause),
        }
    }

    /// Cache key whose fetch failed.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying error returned by the fetcher.
    pub fn cause(&self) -> &anyhow::Error {
        &self.cause
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Fetch(_) => StatusCode::BAD_GATEWAY,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, CacheError>;
