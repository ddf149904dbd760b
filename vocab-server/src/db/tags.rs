//! Tag queries
//!
//! Tags are global and unique by name. A tag lives only while at least one
//! vocabulary record references it.

use sqlx::SqliteConnection;
use std::collections::HashMap;
use uuid::Uuid;
use vocab_common::db::TagRow;
use vocab_common::{Error, Result};

/// Tags attached to one record, ordered by name
pub async fn tags_for_vocabulary(conn: &mut SqliteConnection, vocabulary_id: &Uuid) -> Result<Vec<TagRow>> {
    let tags = sqlx::query_as::<_, TagRow>(
        r#"
        SELECT t.id, t.name
        FROM tags t
        JOIN vocabulary_tags vt ON vt.tag_id = t.id
        WHERE vt.vocabulary_id = ?
        ORDER BY t.name
        "#,
    )
    .bind(vocabulary_id.to_string())
    .fetch_all(&mut *conn)
    .await?;

    Ok(tags)
}

/// Tags of every record owned by `user_id`, keyed by vocabulary id
pub async fn tags_for_user(conn: &mut SqliteConnection, user_id: &str) -> Result<HashMap<String, Vec<TagRow>>> {
    let rows = sqlx::query_as::<_, (String, String, String)>(
        r#"
        SELECT vt.vocabulary_id, t.id, t.name
        FROM vocabulary_tags vt
        JOIN tags t ON t.id = vt.tag_id
        JOIN vocabularies v ON v.id = vt.vocabulary_id
        WHERE v.user_id = ?
        ORDER BY t.name
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut by_record: HashMap<String, Vec<TagRow>> = HashMap::new();
    for (vocabulary_id, id, name) in rows {
        by_record.entry(vocabulary_id).or_default().push(TagRow { id, name });
    }
    Ok(by_record)
}

/// Find a tag by exact name, creating it if absent
///
/// Concurrent creators of the same name converge on one row through the
/// unique constraint.
pub async fn find_or_create_tag(conn: &mut SqliteConnection, name: &str) -> Result<TagRow> {
    sqlx::query("INSERT INTO tags (id, name) VALUES (?, ?) ON CONFLICT(name) DO NOTHING")
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .execute(&mut *conn)
        .await?;

    sqlx::query_as::<_, TagRow>("SELECT id, name FROM tags WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| Error::Internal(format!("Tag '{}' missing after upsert", name)))
}

/// Link a tag to a record; linking twice is a no-op
pub async fn attach_tag(conn: &mut SqliteConnection, vocabulary_id: &Uuid, tag_id: &str) -> Result<bool> {
    let result = sqlx::query("INSERT OR IGNORE INTO vocabulary_tags (vocabulary_id, tag_id) VALUES (?, ?)")
        .bind(vocabulary_id.to_string())
        .bind(tag_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Unlink tags from a record; returns the number of links removed
pub async fn detach_tags(conn: &mut SqliteConnection, vocabulary_id: &Uuid, tag_ids: &[Uuid]) -> Result<u64> {
    let mut removed = 0;
    for tag_id in tag_ids {
        let result = sqlx::query("DELETE FROM vocabulary_tags WHERE vocabulary_id = ? AND tag_id = ?")
            .bind(vocabulary_id.to_string())
            .bind(tag_id.to_string())
            .execute(&mut *conn)
            .await?;
        removed += result.rows_affected();
    }
    Ok(removed)
}

/// Delete every tag no record references
///
/// A single statement evaluated against the caller's transaction snapshot, so
/// a tag linked earlier in the same transaction is never removed.
pub async fn delete_orphan_tags(conn: &mut SqliteConnection) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM tags
        WHERE NOT EXISTS (
            SELECT 1 FROM vocabulary_tags vt WHERE vt.tag_id = tags.id
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}
