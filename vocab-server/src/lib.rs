//! vocab-server library - personal vocabulary notebook service
//!
//! Signed-in users keep words, phrases and grammar points with meanings,
//! inflected forms, example sentences and tags, and practice them as
//! flashcards.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;
use vocab_common::events::EventBus;

pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// View invalidation broadcast
    pub event_bus: EventBus,
    /// Server start time, reported as uptime by `/health`
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, event_bus: EventBus) -> Self {
        Self {
            db,
            event_bus,
            startup_time: chrono::Utc::now(),
        }
    }
}

/// Build application router
///
/// Everything except `/health` and `/api/register` requires a session.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    // Protected routes (require a session)
    let protected = Router::new()
        .route(
            "/api/vocabulary",
            get(api::list_vocabularies).post(api::add_vocabulary),
        )
        .route("/api/vocabulary/stats", get(api::get_vocabulary_stats))
        .route(
            "/api/vocabulary/:id",
            get(api::get_vocabulary)
                .put(api::update_vocabulary)
                .delete(api::delete_vocabulary),
        )
        .route("/api/practice", get(api::get_practice_deck))
        .route("/api/profile", get(api::get_profile).put(api::update_profile))
        .route("/api/events", get(api::event_stream))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_session,
        ));

    // Public routes
    let public = Router::new()
        .route("/api/register", post(api::register))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
