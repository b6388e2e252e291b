//! API error taxonomy and its HTTP mapping.
//!
//! `NotFound` and `InvalidReference`/bad input are the only client-visible
//! distinctions; every other collaborator failure surfaces as an opaque 500
//! carrying only the original message text. A registry write that exhausts
//! its compare-and-swap retries maps to 409.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kiln_abstraction::{PlatformError, StoreError};
use kiln_training::TrainingError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(path) => Self::NotFound(format!("object not found: {path}")),
            StoreError::InvalidReference(url) => {
                Self::BadRequest(format!("invalid store locator: {url}"))
            }
            StoreError::Conflict(path) => Self::Conflict(format!("write conflict on {path}")),
            StoreError::Collaborator(msg) => Self::Internal(msg),
        }
    }
}

impl From<PlatformError> for ApiError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::NotFound(resource) => {
                Self::NotFound(format!("platform resource not found: {resource}"))
            }
            PlatformError::Collaborator(msg) => Self::Internal(msg),
        }
    }
}

impl From<TrainingError> for ApiError {
    fn from(err: TrainingError) -> Self {
        match err {
            TrainingError::Store(store) => store.into(),
            TrainingError::Registry(msg) => Self::Conflict(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_reference_maps_to_bad_request() {
        let err: ApiError = StoreError::InvalidReference("s3://x/y".to_string()).into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_collaborator_failure_stays_opaque() {
        let err: ApiError = StoreError::Collaborator("connection reset".to_string()).into();
        match err {
            ApiError::Internal(msg) => assert_eq!(msg, "connection reset"),
            _ => panic!("expected Internal variant"),
        }
    }

    #[test]
    fn test_training_store_error_passes_through() {
        let err: ApiError =
            TrainingError::Store(StoreError::NotFound("datasets/x".to_string())).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
