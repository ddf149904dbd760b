//! Create, delete and read vocabulary records

use crate::db;
use crate::models::{
    ExampleSentence, Genre, ListFilter, Tag, Vocabulary, VocabularyDetail, VocabularyForm,
    VocabularyStats, VocabularySummary,
};
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::info;
use uuid::Uuid;
use vocab_common::db::TagRow;
use vocab_common::{Error, Result};

fn to_tags(rows: Vec<TagRow>) -> Result<Vec<Tag>> {
    rows.into_iter().map(Tag::try_from).collect()
}

/// Create a record with its tags and examples
///
/// Tags are found-or-created by name. Example ids in the form are ignored.
pub async fn add_vocabulary(pool: &SqlitePool, user_id: &str, form: &VocabularyForm) -> Result<Vocabulary> {
    let mut tx = pool.begin().await?;

    let row = db::vocabulary::insert_vocabulary(&mut *tx, user_id, &form.fields, Utc::now()).await?;
    let vocabulary = Vocabulary::try_from(row)?;

    let mut seen = HashSet::new();
    for name in form.tags.iter().map(|t| t.name()).filter(|n| seen.insert(*n)) {
        let tag = db::tags::find_or_create_tag(&mut *tx, name).await?;
        db::tags::attach_tag(&mut *tx, &vocabulary.id, &tag.id).await?;
    }

    for example in &form.examples {
        db::examples::insert_example(&mut *tx, &vocabulary.id, example.text(), example.translation()).await?;
    }

    tx.commit().await?;

    info!(vocabulary_id = %vocabulary.id, genre = %vocabulary.genre, "Vocabulary added");
    Ok(vocabulary)
}

/// Delete a record owned by `user_id` and sweep tags it left unreferenced
pub async fn delete_vocabulary(pool: &SqlitePool, user_id: &str, id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await?;

    if db::vocabulary::delete_owned(&mut *tx, user_id, &id).await? == 0 {
        return Err(Error::NotFound(format!("Vocabulary {}", id)));
    }
    let orphans = db::tags::delete_orphan_tags(&mut *tx).await?;

    tx.commit().await?;

    info!(vocabulary_id = %id, orphan_tags_deleted = orphans, "Vocabulary deleted");
    Ok(())
}

/// The user's records matching `filter`, most recently updated first
pub async fn list_vocabularies(
    pool: &SqlitePool,
    user_id: &str,
    filter: &ListFilter,
) -> Result<Vec<VocabularySummary>> {
    let mut conn = pool.acquire().await?;

    let rows = db::vocabulary::list_for_user(&mut *conn, user_id, filter).await?;
    let mut tags = db::tags::tags_for_user(&mut *conn, user_id).await?;

    rows.into_iter()
        .map(|row| -> Result<VocabularySummary> {
            let record_tags = tags.remove(&row.id).unwrap_or_default();
            Ok(VocabularySummary {
                vocabulary: Vocabulary::try_from(row)?,
                tags: to_tags(record_tags)?,
            })
        })
        .collect()
}

/// One record with tags, examples and applicable inflected forms
pub async fn get_vocabulary(pool: &SqlitePool, user_id: &str, id: Uuid) -> Result<VocabularyDetail> {
    let mut conn = pool.acquire().await?;

    let row = db::vocabulary::fetch_owned(&mut *conn, user_id, &id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Vocabulary {}", id)))?;
    let vocabulary = Vocabulary::try_from(row)?;

    let tags = to_tags(db::tags::tags_for_vocabulary(&mut *conn, &id).await?)?;
    let examples = db::examples::examples_for_vocabulary(&mut *conn, &id)
        .await?
        .into_iter()
        .map(ExampleSentence::try_from)
        .collect::<Result<Vec<_>>>()?;
    let forms = vocabulary
        .inflections
        .applicable(vocabulary.genre, vocabulary.part_of_speech);

    Ok(VocabularyDetail {
        vocabulary,
        tags,
        examples,
        forms,
    })
}

/// Record counts per genre
pub async fn vocabulary_stats(pool: &SqlitePool, user_id: &str) -> Result<VocabularyStats> {
    let mut conn = pool.acquire().await?;
    let counts = db::vocabulary::count_by_genre(&mut *conn, user_id).await?;

    let mut stats = VocabularyStats::default();
    for (genre, count) in counts {
        match genre.parse::<Genre>() {
            Ok(Genre::Word) => stats.word = count,
            Ok(Genre::Phrase) => stats.phrase = count,
            Ok(Genre::Grammar) => stats.grammar = count,
            Err(_) => {}
        }
        stats.total += count;
    }
    Ok(stats)
}
