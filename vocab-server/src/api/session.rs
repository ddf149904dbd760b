//! Session gate for protected routes
//!
//! Sessions are issued by an external identity service, which stores the
//! SHA-256 of each bearer token in `sessions`. A request carries the token in
//! `Authorization: Bearer <token>` or in the `session` cookie. Requests
//! without a valid session are redirected to the sign-in page.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use tracing::{debug, error};
use vocab_common::auth::hash_token;

use crate::db;
use crate::AppState;

/// Sign-in page unauthenticated requests are sent to
pub const LOGIN_PATH: &str = "/login";

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

/// Signed-in user, available to handlers as `Extension<CurrentUser>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// Extract the session token from the request headers
fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Session middleware
///
/// Resolves the session to a [`CurrentUser`] and inserts it into the request
/// extensions. Applied to protected routes only.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, SessionError> {
    let token = session_token(request.headers()).ok_or(SessionError::Missing)?;

    let mut conn = state
        .db
        .acquire()
        .await
        .map_err(|e| SessionError::Storage(e.to_string()))?;
    let user = db::users::find_session_user(&mut *conn, &hash_token(&token), Utc::now())
        .await
        .map_err(|e| SessionError::Storage(e.to_string()))?
        .ok_or(SessionError::Invalid)?;
    drop(conn);

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        email: user.email,
        name: user.name,
    });

    Ok(next.run(request).await)
}

/// Session gate failures
#[derive(Debug)]
pub enum SessionError {
    /// No token in the request
    Missing,
    /// Token unknown or expired
    Invalid,
    /// Session lookup failed
    Storage(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        match self {
            SessionError::Missing | SessionError::Invalid => {
                debug!("No valid session ({:?}), redirecting to {}", self, LOGIN_PATH);
                Redirect::to(LOGIN_PATH).into_response()
            }
            SessionError::Storage(msg) => {
                error!("Session lookup failed: {}", msg);
                let body = Json(json!({
                    "error": "Session lookup failed",
                }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}
