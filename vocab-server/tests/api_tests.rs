//! Integration tests for vocab-server API endpoints
//!
//! Tests cover:
//! - Health endpoint (no session required)
//! - Session gate redirects
//! - Vocabulary add, list, filter, detail, update, delete and stats
//! - Practice deck and profile
//! - Cross-user isolation

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method
use vocab_common::auth::hash_token;
use vocab_common::db::init_database;
use vocab_common::events::{EventBus, VocabEvent};
use vocab_server::{build_router, db, AppState};

/// Test helper: fresh database in a temp directory
async fn setup_test_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().expect("Should create temp dir");
    let pool = init_database(&dir.path().join("vocab.db"))
        .await
        .expect("Should initialize database");
    (dir, pool)
}

/// Test helper: Create app sharing the given event bus
fn setup_app(db: SqlitePool, event_bus: EventBus) -> axum::Router {
    build_router(AppState::new(db, event_bus))
}

/// Test helper: register a user with a live session; returns (user_id, token)
async fn signed_in_user(pool: &SqlitePool, email: &str) -> (String, String) {
    let mut conn = pool.acquire().await.unwrap();
    let user_id = uuid::Uuid::new_v4().to_string();
    let user = db::users::insert_user(&mut *conn, &user_id, email, "Learner").await.unwrap();
    let token = format!("token-{}", user.id);
    db::users::insert_session(&mut *conn, &hash_token(&token), &user.id, Utc::now() + Duration::hours(1))
        .await
        .unwrap();
    (user.id, token)
}

/// Test helper: Create request carrying a bearer token
fn test_request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn word(content: &str, meaning: &str) -> Value {
    json!({
        "content": content,
        "genre": "word",
        "partOfSpeech": "noun",
        "meaning": meaning,
        "plural": format!("{}s", content),
        "tags": ["daily"],
        "examples": [{"text": format!("A {}.", content), "translation": "Un exemple."}]
    })
}

/// Test helper: add a record through the API and return its id
async fn add(app: &axum::Router, token: &str, body: Value) -> String {
    let response = app
        .clone()
        .oneshot(test_request("POST", "/api/vocabulary", token, Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = extract_json(response.into_body()).await;
    assert_eq!(json["success"], true);
    json["vocabulary"]["id"].as_str().unwrap().to_string()
}

// =============================================================================
// Health and session gate
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_session_required() {
    let (_dir, pool) = setup_test_db().await;
    let app = setup_app(pool, EventBus::new(16));

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "vocab-server");
    assert!(body["version"].is_string());
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_missing_session_redirects_to_login() {
    let (_dir, pool) = setup_test_db().await;
    let app = setup_app(pool, EventBus::new(16));

    let request = Request::builder().uri("/api/vocabulary").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn test_expired_session_redirects_to_login() {
    let (_dir, pool) = setup_test_db().await;
    let mut conn = pool.acquire().await.unwrap();
    let user = db::users::insert_user(&mut *conn, "late-user", "late@example.com", "Late").await.unwrap();
    db::users::insert_session(&mut *conn, &hash_token("stale"), &user.id, Utc::now() - Duration::minutes(1))
        .await
        .unwrap();
    drop(conn);
    let app = setup_app(pool, EventBus::new(16));

    let response = app
        .oneshot(test_request("GET", "/api/vocabulary", "stale", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_session_cookie_accepted() {
    let (_dir, pool) = setup_test_db().await;
    let (_user, token) = signed_in_user(&pool, "cookie@example.com").await;
    let app = setup_app(pool, EventBus::new(16));

    let request = Request::builder()
        .uri("/api/profile")
        .header(header::COOKIE, format!("theme=dark; session={}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["email"], "cookie@example.com");
}

// =============================================================================
// Vocabulary endpoints
// =============================================================================

#[tokio::test]
async fn test_add_then_detail() {
    let (_dir, pool) = setup_test_db().await;
    let (_user, token) = signed_in_user(&pool, "a@example.com").await;
    let app = setup_app(pool, EventBus::new(16));

    let id = add(&app, &token, word("cat", "small feline")).await;

    let response = app
        .oneshot(test_request("GET", &format!("/api/vocabulary/{}", id), &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["content"], "cat");
    assert_eq!(body["partOfSpeech"], "noun");
    assert_eq!(body["tags"][0]["name"], "daily");
    assert_eq!(body["examples"][0]["text"], "A cat.");
    assert_eq!(body["forms"], json!([{"field": "plural", "value": "cats"}]));
}

#[tokio::test]
async fn test_add_rejects_invalid_form() {
    let (_dir, pool) = setup_test_db().await;
    let (_user, token) = signed_in_user(&pool, "a@example.com").await;
    let app = setup_app(pool, EventBus::new(16));

    let body = json!({
        "content": "cat",
        "genre": "word",
        "meaning": "feline",
        "examples": [{"text": "A cat.", "translation": ""}]
    });
    let response = app
        .oneshot(test_request("POST", "/api/vocabulary", &token, Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = extract_json(response.into_body()).await;
    assert_eq!(json["success"], false);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_list_filters_and_search() {
    let (_dir, pool) = setup_test_db().await;
    let (_user, token) = signed_in_user(&pool, "a@example.com").await;
    let app = setup_app(pool, EventBus::new(16));

    add(&app, &token, word("cat", "small feline")).await;
    add(&app, &token, word("dog", "loyal canine")).await;
    add(
        &app,
        &token,
        json!({"content": "break a leg", "genre": "phrase", "meaning": "good luck"}),
    )
    .await;

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/vocabulary", &token, None))
        .await
        .unwrap();
    let all = extract_json(response.into_body()).await;
    assert_eq!(all.as_array().unwrap().len(), 3);
    assert_eq!(all[0]["content"], "break a leg");

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/vocabulary?genre=phrase", &token, None))
        .await
        .unwrap();
    let phrases = extract_json(response.into_body()).await;
    assert_eq!(phrases.as_array().unwrap().len(), 1);

    let response = app
        .oneshot(test_request("GET", "/api/vocabulary?q=CANINE", &token, None))
        .await
        .unwrap();
    let found = extract_json(response.into_body()).await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["content"], "dog");
    assert_eq!(found[0]["tags"][0]["name"], "daily");
}

#[tokio::test]
async fn test_update_reconciles_and_emits_invalidations() {
    let (_dir, pool) = setup_test_db().await;
    let (user_id, token) = signed_in_user(&pool, "a@example.com").await;
    let bus = EventBus::new(16);
    let app = setup_app(pool.clone(), bus.clone());

    let id = add(&app, &token, word("cat", "small feline")).await;
    let mut rx = bus.subscribe();

    let body = json!({
        "content": "cat",
        "genre": "word",
        "partOfSpeech": "noun",
        "meaning": "domestic feline",
        "tags": [{"id": null, "name": "daily"}, {"id": null, "name": "animals"}],
        "examples": []
    });
    let response = app
        .clone()
        .oneshot(test_request("PUT", &format!("/api/vocabulary/{}", id), &token, Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_json(response.into_body()).await, json!({"success": true}));

    let paths: Vec<String> = (0..2)
        .map(|_| match rx.try_recv().expect("Should receive invalidation") {
            VocabEvent::ViewInvalidated { path, user_id: owner, .. } => {
                assert_eq!(owner, user_id);
                path
            }
        })
        .collect();
    assert_eq!(paths, vec!["/vocabulary".to_string(), format!("/vocabulary/{}", id)]);

    let response = app
        .oneshot(test_request("GET", &format!("/api/vocabulary/{}", id), &token, None))
        .await
        .unwrap();
    let detail = extract_json(response.into_body()).await;
    assert_eq!(detail["meaning"], "domestic feline");
    assert_eq!(detail["tags"].as_array().unwrap().len(), 2);
    assert_eq!(detail["examples"], json!([]));
}

#[tokio::test]
async fn test_other_users_record_is_not_found() {
    let (_dir, pool) = setup_test_db().await;
    let (_owner, owner_token) = signed_in_user(&pool, "owner@example.com").await;
    let (_other, other_token) = signed_in_user(&pool, "other@example.com").await;
    let app = setup_app(pool, EventBus::new(16));

    let id = add(&app, &owner_token, word("cat", "small feline")).await;
    let uri = format!("/api/vocabulary/{}", id);

    let response = app
        .clone()
        .oneshot(test_request("GET", &uri, &other_token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(test_request("PUT", &uri, &other_token, Some(word("dog", "canine"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body, json!({"success": false, "error": "Vocabulary not found."}));

    let response = app
        .clone()
        .oneshot(test_request("DELETE", &uri, &other_token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(test_request("GET", &uri, &owner_token, None))
        .await
        .unwrap();
    let detail = extract_json(response.into_body()).await;
    assert_eq!(detail["content"], "cat");
}

#[tokio::test]
async fn test_delete_then_stats() {
    let (_dir, pool) = setup_test_db().await;
    let (_user, token) = signed_in_user(&pool, "a@example.com").await;
    let app = setup_app(pool, EventBus::new(16));

    let cat = add(&app, &token, word("cat", "small feline")).await;
    add(&app, &token, word("dog", "loyal canine")).await;
    add(
        &app,
        &token,
        json!({"content": "used to", "genre": "grammar", "meaning": "past habit"}),
    )
    .await;

    let response = app
        .clone()
        .oneshot(test_request("DELETE", &format!("/api/vocabulary/{}", cat), &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(test_request("GET", "/api/vocabulary/stats", &token, None))
        .await
        .unwrap();
    let stats = extract_json(response.into_body()).await;
    assert_eq!(stats, json!({"total": 2, "word": 1, "phrase": 0, "grammar": 1}));
}

#[tokio::test]
async fn test_malformed_requests_use_action_result_shape() {
    let (_dir, pool) = setup_test_db().await;
    let (_user, token) = signed_in_user(&pool, "a@example.com").await;
    let app = setup_app(pool, EventBus::new(16));

    let request = Request::builder()
        .method("POST")
        .uri("/api/vocabulary")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    let response = app
        .clone()
        .oneshot(test_request("PUT", "/api/vocabulary/not-a-uuid", &token, Some(word("cat", "feline"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body, json!({"success": false, "error": "Vocabulary not found."}));

    let response = app
        .clone()
        .oneshot(test_request("DELETE", "/api/vocabulary/not-a-uuid", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], false);

    let response = app
        .oneshot(test_request("GET", "/api/vocabulary/not-a-uuid", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

// =============================================================================
// Practice and profile
// =============================================================================

#[tokio::test]
async fn test_practice_deck_modes() {
    let (_dir, pool) = setup_test_db().await;
    let (_user, token) = signed_in_user(&pool, "a@example.com").await;
    let app = setup_app(pool, EventBus::new(16));

    add(&app, &token, word("cat", "small feline")).await;

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/practice", &token, None))
        .await
        .unwrap();
    let deck = extract_json(response.into_body()).await;
    assert_eq!(deck[0]["prompt"], "cat");
    assert_eq!(deck[0]["answer"], "small feline");
    assert_eq!(deck[0]["examples"][0]["text"], "A cat.");

    let response = app
        .oneshot(test_request("GET", "/api/practice?mode=word", &token, None))
        .await
        .unwrap();
    let deck = extract_json(response.into_body()).await;
    assert_eq!(deck[0]["prompt"], "small feline");
    assert_eq!(deck[0]["answer"], "cat");
}

#[tokio::test]
async fn test_register_and_update_profile() {
    let (_dir, pool) = setup_test_db().await;
    let (_user, token) = signed_in_user(&pool, "a@example.com").await;
    let app = setup_app(pool, EventBus::new(16));

    let request = Request::builder()
        .method("POST")
        .uri("/api/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"id": "idp-42", "email": "New@Example.com", "name": "Newcomer"}).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = extract_json(response.into_body()).await;
    assert_eq!(created["id"], "idp-42");
    assert_eq!(created["email"], "new@example.com");

    let duplicate = Request::builder()
        .method("POST")
        .uri("/api/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"id": "idp-43", "email": "new@example.com", "name": "Again"}).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(duplicate).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(body["error"]["message"], "Email is already registered");

    let response = app
        .oneshot(test_request("PUT", "/api/profile", &token, Some(json!({"name": "Renamed"}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let profile = extract_json(response.into_body()).await;
    assert_eq!(profile["name"], "Renamed");
    assert_eq!(profile["email"], "a@example.com");
}
