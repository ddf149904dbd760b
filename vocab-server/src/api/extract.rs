//! Extractors for mutation endpoints
//!
//! Rejections answer in the `{success: false, error}` shape of every other
//! mutation failure instead of axum's plain-text bodies.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::error::ActionResponse;
use crate::models::ActionResult;

/// Message for a record id that does not resolve to a record
pub const VOCABULARY_NOT_FOUND: &str = "Vocabulary not found.";

/// JSON form body
pub struct FormJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for FormJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ActionResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(FormJson(value)),
            Err(rejection) => {
                debug!("Rejected form body: {}", rejection.body_text());
                Err((
                    StatusCode::BAD_REQUEST,
                    Json(ActionResult::failure("The submitted form could not be read.")),
                ))
            }
        }
    }
}

/// Vocabulary id from the `:id` path segment
///
/// An id that is not a UUID cannot name any record and is reported as not found.
pub struct RecordId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = ActionResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let not_found = || {
            (
                StatusCode::NOT_FOUND,
                Json(ActionResult::failure(VOCABULARY_NOT_FOUND)),
            )
        };

        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| not_found())?;
        Uuid::parse_str(&raw).map(RecordId).map_err(|_| not_found())
    }
}
