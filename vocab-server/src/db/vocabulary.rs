//! Vocabulary record queries
//!
//! Every query is scoped by `user_id`. A record owned by someone else is
//! indistinguishable from a missing one.

use crate::models::{ListFilter, VocabularyFields};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use uuid::Uuid;
use vocab_common::db::VocabularyRow;
use vocab_common::Result;

const VOCABULARY_COLUMNS: &str = r#"
    id, user_id, genre, content, part_of_speech, meaning, notes,
    plural, comparative, superlative, present_tense, third_person_singular,
    past_tense, past_participle, present_participle, possessive, objective, reflexive,
    created_at, updated_at
"#;

/// Fetch a record only if it belongs to `user_id`
pub async fn fetch_owned(
    conn: &mut SqliteConnection,
    user_id: &str,
    id: &Uuid,
) -> Result<Option<VocabularyRow>> {
    let sql = format!(
        "SELECT {} FROM vocabularies WHERE id = ? AND user_id = ?",
        VOCABULARY_COLUMNS
    );
    let row = sqlx::query_as::<_, VocabularyRow>(&sql)
        .bind(id.to_string())
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row)
}

/// Insert a new record for `user_id`
pub async fn insert_vocabulary(
    conn: &mut SqliteConnection,
    user_id: &str,
    fields: &VocabularyFields,
    now: DateTime<Utc>,
) -> Result<VocabularyRow> {
    let id = Uuid::new_v4();
    let i = &fields.inflections;

    sqlx::query(
        r#"
        INSERT INTO vocabularies (
            id, user_id, genre, content, part_of_speech, meaning, notes,
            plural, comparative, superlative, present_tense, third_person_singular,
            past_tense, past_participle, present_participle, possessive, objective, reflexive,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(user_id)
    .bind(fields.genre.as_str())
    .bind(&fields.content)
    .bind(fields.part_of_speech.map(|p| p.as_str()))
    .bind(&fields.meaning)
    .bind(&fields.notes)
    .bind(&i.plural)
    .bind(&i.comparative)
    .bind(&i.superlative)
    .bind(&i.present_tense)
    .bind(&i.third_person_singular)
    .bind(&i.past_tense)
    .bind(&i.past_participle)
    .bind(&i.present_participle)
    .bind(&i.possessive)
    .bind(&i.objective)
    .bind(&i.reflexive)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    fetch_owned(conn, user_id, &id).await?.ok_or_else(|| {
        vocab_common::Error::Internal(format!("Inserted vocabulary {} not readable", id))
    })
}

/// Overwrite the scalar fields and bump `updated_at`
///
/// Returns the number of rows changed: 0 when the record is missing or not owned.
pub async fn update_fields(
    conn: &mut SqliteConnection,
    user_id: &str,
    id: &Uuid,
    fields: &VocabularyFields,
    now: DateTime<Utc>,
) -> Result<u64> {
    let i = &fields.inflections;

    let result = sqlx::query(
        r#"
        UPDATE vocabularies SET
            genre = ?, content = ?, part_of_speech = ?, meaning = ?, notes = ?,
            plural = ?, comparative = ?, superlative = ?, present_tense = ?,
            third_person_singular = ?, past_tense = ?, past_participle = ?,
            present_participle = ?, possessive = ?, objective = ?, reflexive = ?,
            updated_at = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(fields.genre.as_str())
    .bind(&fields.content)
    .bind(fields.part_of_speech.map(|p| p.as_str()))
    .bind(&fields.meaning)
    .bind(&fields.notes)
    .bind(&i.plural)
    .bind(&i.comparative)
    .bind(&i.superlative)
    .bind(&i.present_tense)
    .bind(&i.third_person_singular)
    .bind(&i.past_tense)
    .bind(&i.past_participle)
    .bind(&i.present_participle)
    .bind(&i.possessive)
    .bind(&i.objective)
    .bind(&i.reflexive)
    .bind(now)
    .bind(id.to_string())
    .bind(user_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Delete a record owned by `user_id`; children cascade
pub async fn delete_owned(conn: &mut SqliteConnection, user_id: &str, id: &Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM vocabularies WHERE id = ? AND user_id = ?")
        .bind(id.to_string())
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// List the user's records, most recently updated first
pub async fn list_for_user(
    conn: &mut SqliteConnection,
    user_id: &str,
    filter: &ListFilter,
) -> Result<Vec<VocabularyRow>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
    query.push(VOCABULARY_COLUMNS);
    query.push(" FROM vocabularies WHERE user_id = ");
    query.push_bind(user_id.to_string());

    if let Some(genre) = filter.genre {
        query.push(" AND genre = ").push_bind(genre.as_str());
    }
    if let Some(part_of_speech) = filter.part_of_speech {
        query.push(" AND part_of_speech = ").push_bind(part_of_speech.as_str());
    }
    if let Some(term) = filter.q.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        query
            .push(" AND (content LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR meaning LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }

    query.push(" ORDER BY updated_at DESC, created_at DESC");

    let rows = query
        .build_query_as::<VocabularyRow>()
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows)
}

/// Count the user's records per genre
pub async fn count_by_genre(conn: &mut SqliteConnection, user_id: &str) -> Result<Vec<(String, i64)>> {
    let counts = sqlx::query_as::<_, (String, i64)>(
        "SELECT genre, COUNT(*) FROM vocabularies WHERE user_id = ? GROUP BY genre",
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(counts)
}
