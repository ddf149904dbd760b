//! Flashcard practice endpoint

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::models::{Genre, ListFilter, PracticeCard, PracticeMode};
use crate::services;
use crate::AppState;

use super::CurrentUser;

#[derive(Debug, Deserialize)]
pub struct PracticeQuery {
    #[serde(default)]
    pub mode: PracticeMode,
    #[serde(default)]
    pub genre: Option<Genre>,
    #[serde(default = "default_shuffle")]
    pub shuffle: bool,
}

fn default_shuffle() -> bool {
    true
}

/// GET /api/practice?mode=definition|word&genre=&shuffle=
pub async fn get_practice_deck(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<PracticeQuery>,
) -> ApiResult<Json<Vec<PracticeCard>>> {
    let filter = ListFilter {
        genre: query.genre,
        ..ListFilter::default()
    };
    let deck = services::practice::practice_deck(&state.db, &user.id, query.mode, &filter, query.shuffle)
        .await?;
    Ok(Json(deck))
}
