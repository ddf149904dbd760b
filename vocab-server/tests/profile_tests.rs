//! Integration tests for registration and profile updates
//!
//! Tests cover:
//! - Issued ids kept on registration
//! - Duplicate emails reported as validation errors, including under contention
//! - Email changes onto a taken address

use sqlx::SqlitePool;
use tempfile::TempDir;
use vocab_common::db::init_database;
use vocab_common::Error;
use vocab_server::services;

async fn setup_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().expect("Should create temp dir");
    let pool = init_database(&dir.path().join("vocab.db"))
        .await
        .expect("Should initialize database");
    (dir, pool)
}

fn is_invalid_input(result: &Result<vocab_server::models::User, Error>, expected: &str) -> bool {
    matches!(result, Err(Error::InvalidInput(msg)) if msg == expected)
}

#[tokio::test]
async fn test_register_keeps_issued_id() {
    let (_dir, pool) = setup_db().await;

    let user = services::profile::register_user(&pool, "idp-7", " Kim@Example.com ", "Kim")
        .await
        .expect("Should register");

    assert_eq!(user.id, "idp-7");
    assert_eq!(user.email, "kim@example.com");
    let fetched = services::profile::get_profile(&pool, "idp-7").await.unwrap();
    assert_eq!(fetched, user);
}

#[tokio::test]
async fn test_register_rejects_blank_id_and_duplicates() {
    let (_dir, pool) = setup_db().await;

    let blank = services::profile::register_user(&pool, "  ", "a@example.com", "A").await;
    assert!(is_invalid_input(&blank, "Missing user id"));

    services::profile::register_user(&pool, "u1", "a@example.com", "A").await.unwrap();

    let same_email = services::profile::register_user(&pool, "u2", "A@example.com", "B").await;
    assert!(is_invalid_input(&same_email, "Email is already registered"));

    let same_id = services::profile::register_user(&pool, "u1", "b@example.com", "B").await;
    assert!(is_invalid_input(&same_id, "User is already registered"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_with_one_email() {
    let (_dir, pool) = setup_db().await;

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let pool = pool.clone();
            tokio::spawn(async move {
                services::profile::register_user(&pool, &format!("u{}", n), "race@example.com", "Racer").await
            })
        })
        .collect();

    let mut registered = 0;
    for handle in handles {
        let result = handle.await.expect("Task should not panic");
        match result {
            Ok(_) => registered += 1,
            Err(ref e) => assert!(
                is_invalid_input(&result, "Email is already registered"),
                "Unexpected error: {}",
                e
            ),
        }
    }
    assert_eq!(registered, 1);
}

#[tokio::test]
async fn test_update_profile_to_taken_email() {
    let (_dir, pool) = setup_db().await;
    services::profile::register_user(&pool, "u1", "a@example.com", "A").await.unwrap();
    services::profile::register_user(&pool, "u2", "b@example.com", "B").await.unwrap();

    let result = services::profile::update_profile(&pool, "u2", "B", Some("a@example.com")).await;
    assert!(is_invalid_input(&result, "Email is already registered"));

    let unchanged = services::profile::get_profile(&pool, "u2").await.unwrap();
    assert_eq!(unchanged.email, "b@example.com");

    let renamed = services::profile::update_profile(&pool, "u2", "Bea", None).await.unwrap();
    assert_eq!(renamed.name, "Bea");
    assert_eq!(renamed.email, "b@example.com");

    let missing = services::profile::update_profile(&pool, "nobody", "X", None).await;
    assert!(matches!(missing, Err(Error::NotFound(_))));
}
