//! Example sentence queries

use chrono::Utc;
use sqlx::SqliteConnection;
use std::collections::HashMap;
use uuid::Uuid;
use vocab_common::db::ExampleRow;
use vocab_common::Result;

/// Examples of one record in insertion order
pub async fn examples_for_vocabulary(
    conn: &mut SqliteConnection,
    vocabulary_id: &Uuid,
) -> Result<Vec<ExampleRow>> {
    let examples = sqlx::query_as::<_, ExampleRow>(
        r#"
        SELECT id, vocabulary_id, text, translation
        FROM example_sentences
        WHERE vocabulary_id = ?
        ORDER BY created_at, rowid
        "#,
    )
    .bind(vocabulary_id.to_string())
    .fetch_all(&mut *conn)
    .await?;

    Ok(examples)
}

/// Examples of every record owned by `user_id`, keyed by vocabulary id
pub async fn examples_for_user(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<HashMap<String, Vec<ExampleRow>>> {
    let rows = sqlx::query_as::<_, ExampleRow>(
        r#"
        SELECT e.id, e.vocabulary_id, e.text, e.translation
        FROM example_sentences e
        JOIN vocabularies v ON v.id = e.vocabulary_id
        WHERE v.user_id = ?
        ORDER BY e.created_at, e.rowid
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut by_record: HashMap<String, Vec<ExampleRow>> = HashMap::new();
    for row in rows {
        by_record.entry(row.vocabulary_id.clone()).or_default().push(row);
    }
    Ok(by_record)
}

/// Insert an example with a server-generated id
pub async fn insert_example(
    conn: &mut SqliteConnection,
    vocabulary_id: &Uuid,
    text: &str,
    translation: Option<&str>,
) -> Result<Uuid> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO example_sentences (id, vocabulary_id, text, translation, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(vocabulary_id.to_string())
    .bind(text)
    .bind(translation)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(id)
}

/// Overwrite an example of `vocabulary_id`; 0 rows when it no longer exists
pub async fn update_example(
    conn: &mut SqliteConnection,
    vocabulary_id: &Uuid,
    id: &Uuid,
    text: &str,
    translation: Option<&str>,
) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE example_sentences SET text = ?, translation = ? WHERE id = ? AND vocabulary_id = ?",
    )
    .bind(text)
    .bind(translation)
    .bind(id.to_string())
    .bind(vocabulary_id.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Delete examples of `vocabulary_id` by id
pub async fn delete_examples(conn: &mut SqliteConnection, vocabulary_id: &Uuid, ids: &[Uuid]) -> Result<u64> {
    let mut removed = 0;
    for id in ids {
        let result = sqlx::query("DELETE FROM example_sentences WHERE id = ? AND vocabulary_id = ?")
            .bind(id.to_string())
            .bind(vocabulary_id.to_string())
            .execute(&mut *conn)
            .await?;
        removed += result.rows_affected();
    }
    Ok(removed)
}
