//! Registration and profile endpoints

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::models::User;
use crate::services;
use crate::AppState;

use super::CurrentUser;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Id issued by the identity service
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// POST /api/register
///
/// Public; the identity service issues sessions for registered users.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = services::profile::register_user(&state.db, &request.id, &request.email, &request.name).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<User>> {
    let profile = services::profile::get_profile(&state.db, &user.id).await?;
    Ok(Json(profile))
}

/// PUT /api/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<User>> {
    let profile = services::profile::update_profile(&state.db, &user.id, &update.name, update.email.as_deref())
            .await?;
    Ok(Json(profile))
}
