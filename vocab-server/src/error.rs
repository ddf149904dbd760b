//! HTTP error types for vocab-server
//!
//! Read endpoints return [`ApiError`] with a `{"error": {code, message}}`
//! body. Mutations answer with an [`ActionResult`] instead; see
//! [`action_failure`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::models::ActionResult;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<vocab_common::Error> for ApiError {
    fn from(err: vocab_common::Error) -> Self {
        match err {
            vocab_common::Error::NotFound(msg) => ApiError::NotFound(msg),
            vocab_common::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => {
                error!("Request failed: {}", other);
                ApiError::Internal("An unexpected error occurred".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Response of a mutation endpoint
pub type ActionResponse = (StatusCode, Json<ActionResult>);

/// Map a failed mutation to a user-safe [`ActionResult`]
///
/// Validation messages are shown as-is. Storage failures are logged with
/// their detail and replaced by `generic_message`.
pub fn action_failure(err: vocab_common::Error, not_found_message: &str, generic_message: &str) -> ActionResponse {
    match err {
        vocab_common::Error::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(ActionResult::failure(not_found_message)),
        ),
        vocab_common::Error::InvalidInput(msg) => {
            (StatusCode::BAD_REQUEST, Json(ActionResult::failure(msg)))
        }
        other => {
            error!("{}: {}", generic_message, other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ActionResult::failure(generic_message)),
            )
        }
    }
}
