//! Error types for the movie catalog
//!
//! Provides unified error handling using thiserror. Store errors stay inside
//! the cache layer, upstream errors travel to the caller unchanged, and
//! `ApiError` is what the HTTP layer renders.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Store Error Enum ==
/// Failures of the key-value store backing the cache.
///
/// None of these ever reach an API caller: the cache service treats them as
/// a miss on reads and a no-op on writes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The store could not be reached
    #[error("cache store unavailable: {0}")]
    Unavailable(String),

    /// The store did not answer within the configured bound
    #[error("cache store timed out after {0:?}")]
    Timeout(Duration),

    /// The backend has no native pattern delete
    #[error("pattern delete not supported by {0} store")]
    Unsupported(&'static str),

    /// The entry was refused (key or value size limits)
    #[error("cache entry rejected: {0}")]
    Rejected(String),

    /// The store reached its entry limit
    #[error("cache store full ({0} entries)")]
    Full(usize),
}

// == Upstream Error Enum ==
/// Explicit "fetch failed" signal of the upstream movie database.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    /// No API key configured for the upstream
    #[error("TMDb API key is not configured")]
    MissingApiKey,

    /// Network or connection failure
    #[error("upstream request failed: {0}")]
    Transport(String),

    /// Non-success HTTP status
    #[error("upstream returned status {0}")]
    Status(u16),

    /// Body was not the expected JSON shape
    #[error("upstream response could not be decoded: {0}")]
    Decode(String),
}

// == Catalog Error Enum ==
/// Failures of catalog writes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Movie not found: {0}")]
    MovieNotFound(i64),

    #[error("Movie is already in favorites")]
    AlreadyFavorite,

    #[error("Favorite not found for movie {0}")]
    FavoriteNotFound(i64),
}

// == API Error Enum ==
/// Error type rendered by the HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Missing caller identity
    #[error("Authentication required: {0}")]
    Unauthorized(String),

    /// Caller lacks the admin role
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The upstream movie database failed
    #[error("Upstream unavailable: {0}")]
    Upstream(#[from] UpstreamError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::MovieNotFound(_) | CatalogError::AlreadyFavorite => {
                ApiError::InvalidRequest(err.to_string())
            }
            CatalogError::FavoriteNotFound(_) => ApiError::NotFound(err.to_string()),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match self {
            ApiError::NotFound(msg)
            | ApiError::InvalidRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::Internal(msg) => msg,
            ApiError::Upstream(err) => err.to_string(),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP layer.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_maps_to_bad_gateway() {
        let response = ApiError::from(UpstreamError::Status(503)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_catalog_errors_map_to_client_errors() {
        let duplicate: ApiError = CatalogError::AlreadyFavorite.into();
        assert!(matches!(duplicate, ApiError::InvalidRequest(_)));

        let missing: ApiError = CatalogError::FavoriteNotFound(7).into();
        assert!(matches!(missing, ApiError::NotFound(_)));
    }

    #[test]
    fn test_store_timeout_message() {
        let err = StoreError::Timeout(Duration::from_secs(2));
        assert_eq!(err.to_string(), "cache store timed out after 2s");
    }
}
