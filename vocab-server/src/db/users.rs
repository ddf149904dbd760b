//! Users and session lookup

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use vocab_common::db::UserRow;
use vocab_common::Result;

/// Insert a user under the id issued by the identity service
pub async fn insert_user(conn: &mut SqliteConnection, id: &str, email: &str, name: &str) -> Result<UserRow> {
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO users (id, email, name, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(name)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(UserRow {
        id: id.to_string(),
        email: email.to_string(),
        name: name.to_string(),
        created_at: now,
        updated_at: now,
    })
}

pub async fn find_user(conn: &mut SqliteConnection, user_id: &str) -> Result<Option<UserRow>> {
    let user = sqlx::query_as::<_, UserRow>(
        "SELECT id, email, name, created_at, updated_at FROM users WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(user)
}

/// Update the name, and the email when given; returns the number of rows changed
pub async fn update_user(
    conn: &mut SqliteConnection,
    user_id: &str,
    name: &str,
    email: Option<&str>,
) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE users SET name = ?, email = COALESCE(?, email), updated_at = ? WHERE id = ?",
    )
    .bind(name)
    .bind(email)
    .bind(Utc::now())
    .bind(user_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Record a session for `user_id` under the hash of its bearer token
pub async fn insert_session(
    conn: &mut SqliteConnection,
    token_hash: &str,
    user_id: &str,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query("INSERT INTO sessions (token_hash, user_id, expires_at) VALUES (?, ?, ?)")
        .bind(token_hash)
        .bind(user_id)
        .bind(expires_at)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Resolve a session token hash to its user, if the session is still valid
///
/// Expiry is compared in Rust so the check does not depend on how the
/// identity service formatted `expires_at`.
pub async fn find_session_user(
    conn: &mut SqliteConnection,
    token_hash: &str,
    now: DateTime<Utc>,
) -> Result<Option<UserRow>> {
    let session: Option<(String, DateTime<Utc>)> =
        sqlx::query_as("SELECT user_id, expires_at FROM sessions WHERE token_hash = ?")
            .bind(token_hash)
            .fetch_optional(&mut *conn)
            .await?;

    match session {
        Some((user_id, expires_at)) if expires_at > now => find_user(conn, &user_id).await,
        _ => Ok(None),
    }
}
