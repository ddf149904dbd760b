//! Vocabulary record endpoints
//!
//! Mutations answer `{success, error?}` and emit view invalidations on
//! success. Reads return the record data or an [`ApiError`].

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;
use uuid::Uuid;

use crate::error::{action_failure, ActionResponse, ApiError, ApiResult};
use crate::models::{
    ActionResult, ListFilter, VocabularyDetail, VocabularyForm, VocabularyStats, VocabularySummary,
};
use crate::services;
use crate::AppState;

use super::extract::{FormJson, RecordId, VOCABULARY_NOT_FOUND as NOT_FOUND};
use super::CurrentUser;

/// GET /api/vocabulary?genre=&partOfSpeech=&q=
pub async fn list_vocabularies(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(filter): Query<ListFilter>,
) -> ApiResult<Json<Vec<VocabularySummary>>> {
    let records = services::vocabulary::list_vocabularies(&state.db, &user.id, &filter).await?;
    Ok(Json(records))
}

/// GET /api/vocabulary/stats
pub async fn get_vocabulary_stats(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<VocabularyStats>> {
    let stats = services::vocabulary::vocabulary_stats(&state.db, &user.id).await?;
    Ok(Json(stats))
}

/// GET /api/vocabulary/:id
pub async fn get_vocabulary(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<VocabularyDetail>> {
    let id = Uuid::parse_str(&raw_id).map_err(|_| ApiError::NotFound(format!("Vocabulary {}", raw_id)))?;
    let detail = services::vocabulary::get_vocabulary(&state.db, &user.id, id).await?;
    Ok(Json(detail))
}

/// POST /api/vocabulary
pub async fn add_vocabulary(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    FormJson(form): FormJson<VocabularyForm>,
) -> ActionResponse {
    const FAILED: &str = "An error occurred while adding the vocabulary.";

    if let Err(e) = form.validate() {
        return action_failure(e, NOT_FOUND, FAILED);
    }

    match services::vocabulary::add_vocabulary(&state.db, &user.id, &form).await {
        Ok(vocabulary) => {
            state.event_bus.invalidate_list(&user.id);
            (StatusCode::CREATED, Json(ActionResult::created(vocabulary)))
        }
        Err(e) => action_failure(e, NOT_FOUND, FAILED),
    }
}

/// PUT /api/vocabulary/:id
///
/// Replaces the record's fields, tags and examples with the submitted state.
pub async fn update_vocabulary(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    RecordId(id): RecordId,
    FormJson(form): FormJson<VocabularyForm>,
) -> ActionResponse {
    const FAILED: &str = "An error occurred while updating the vocabulary.";

    if let Err(e) = form.validate() {
        return action_failure(e, NOT_FOUND, FAILED);
    }

    match services::update_vocabulary(&state.db, &user.id, id, &form).await {
        Ok(_) => {
            state.event_bus.invalidate_record(&user.id, &id);
            (StatusCode::OK, Json(ActionResult::ok()))
        }
        Err(e) => action_failure(e, NOT_FOUND, FAILED),
    }
}

/// DELETE /api/vocabulary/:id
pub async fn delete_vocabulary(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    RecordId(id): RecordId,
) -> ActionResponse {
    const FAILED: &str = "An error occurred while deleting the vocabulary.";

    match services::vocabulary::delete_vocabulary(&state.db, &user.id, id).await {
        Ok(()) => {
            info!(user_id = %user.id, vocabulary_id = %id, "Delete request completed");
            state.event_bus.invalidate_record(&user.id, &id);
            (StatusCode::OK, Json(ActionResult::ok()))
        }
        Err(e) => action_failure(e, NOT_FOUND, FAILED),
    }
}
