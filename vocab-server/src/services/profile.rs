//! User registration and profile

use crate::db;
use crate::models::User;
use sqlx::SqlitePool;
use tracing::info;
use vocab_common::{Error, Result};

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(Error::InvalidInput("Enter a valid email address".to_string()));
    }
    Ok(email)
}

fn normalize_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("Enter a name".to_string()));
    }
    Ok(name)
}

/// Map a UNIQUE violation on `users` to a validation error
///
/// Uniqueness is left to the constraint so concurrent registrations cannot
/// both pass a prior lookup.
fn registration_conflict(err: Error) -> Error {
    match err {
        Error::Database(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            if db_err.message().contains("users.email") {
                Error::InvalidInput("Email is already registered".to_string())
            } else {
                Error::InvalidInput("User is already registered".to_string())
            }
        }
        other => other,
    }
}

/// Register the user the identity service created under `id`
pub async fn register_user(pool: &SqlitePool, id: &str, email: &str, name: &str) -> Result<User> {
    let id = id.trim();
    if id.is_empty() {
        return Err(Error::InvalidInput("Missing user id".to_string()));
    }
    let email = normalize_email(email)?;
    let name = normalize_name(name)?;

    let mut conn = pool.acquire().await?;
    let row = db::users::insert_user(&mut *conn, id, &email, name)
        .await
        .map_err(registration_conflict)?;

    info!(user_id = %row.id, "User registered");
    Ok(User::from(row))
}

pub async fn get_profile(pool: &SqlitePool, user_id: &str) -> Result<User> {
    let mut conn = pool.acquire().await?;
    db::users::find_user(&mut *conn, user_id)
        .await?
        .map(User::from)
        .ok_or_else(|| Error::NotFound(format!("User {}", user_id)))
}

/// Change the display name and, when given, the email address
pub async fn update_profile(pool: &SqlitePool, user_id: &str, name: &str, email: Option<&str>) -> Result<User> {
    let name = normalize_name(name)?;
    let email = email.map(normalize_email).transpose()?;

    let mut tx = pool.begin().await?;
    let updated = db::users::update_user(&mut *tx, user_id, name, email.as_deref())
        .await
        .map_err(registration_conflict)?;
    if updated == 0 {
        return Err(Error::NotFound(format!("User {}", user_id)));
    }
    let row = db::users::find_user(&mut *tx, user_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User {}", user_id)))?;
    tx.commit().await?;

    Ok(User::from(row))
}
