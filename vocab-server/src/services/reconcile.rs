//! Vocabulary update reconciliation
//!
//! An edit submits the full desired state of a record: scalar fields, the
//! desired tag set and the desired example list. [`update_vocabulary`] makes
//! the stored record match it inside a single transaction:
//!
//! 1. Scalar fields overwritten and `updated_at` bumped, scoped by owner. This
//!    is the first statement so the write lock is held before any read; zero
//!    rows changed means a missing or foreign record (`NotFound`, rolled back)
//! 2. Current tags and examples read under that lock
//! 3. Tags diffed against the current links, new names found-or-created
//! 4. Examples diffed: kept rows updated when changed, unmatched rows deleted,
//!    new content inserted with server ids
//! 5. Tags left without any reference deleted
//!
//! The diffing is pure ([`plan_tags`], [`plan_examples`]) so it can be tested
//! without a database.

use crate::db;
use crate::models::{ExampleInput, ExampleSentence, Tag, TagInput, VocabularyForm};
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;
use vocab_common::{Error, Result};

/// Tag changes for one record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPlan {
    /// Currently linked tags to unlink
    pub detach: Vec<Uuid>,
    /// Names to find-or-create and link, distinct, in submission order
    pub attach_names: Vec<String>,
}

/// Compute tag changes from the current links and the desired set
///
/// A current tag is kept when the desired set names its id or its name.
/// Names that are not already kept are attached.
pub fn plan_tags(current: &[Tag], desired: &[TagInput]) -> TagPlan {
    let current_ids: HashSet<Uuid> = current.iter().map(|t| t.id).collect();
    let desired_ids: HashSet<Uuid> = desired
        .iter()
        .filter_map(|t| match t {
            TagInput::Existing { id, .. } => Some(*id),
            TagInput::New { .. } => None,
        })
        .collect();

    let mut seen = HashSet::new();
    let desired_names: Vec<&str> = desired
        .iter()
        .filter(|t| match t {
            TagInput::Existing { id, .. } => !current_ids.contains(id),
            TagInput::New { .. } => true,
        })
        .map(|t| t.name())
        .filter(|name| seen.insert(*name))
        .collect();

    let retained: Vec<&Tag> = current
        .iter()
        .filter(|t| desired_ids.contains(&t.id) || desired_names.contains(&t.name.as_str()))
        .collect();
    let retained_ids: HashSet<Uuid> = retained.iter().map(|t| t.id).collect();
    let retained_names: HashSet<&str> = retained.iter().map(|t| t.name.as_str()).collect();

    TagPlan {
        detach: current
            .iter()
            .filter(|t| !retained_ids.contains(&t.id))
            .map(|t| t.id)
            .collect(),
        attach_names: desired_names
            .into_iter()
            .filter(|name| !retained_names.contains(name))
            .map(str::to_string)
            .collect(),
    }
}

/// New content for a stored example
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleUpdate {
    /// Stored example owned by the record
    pub id: Uuid,
    pub text: String,
    pub translation: Option<String>,
}

/// Example to insert under a server-generated id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExample {
    pub text: String,
    pub translation: Option<String>,
}

/// Example changes for one record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExamplePlan {
    /// Stored examples no desired entry claimed
    pub delete: Vec<Uuid>,
    /// Claimed examples whose text or translation changed
    pub update: Vec<ExampleUpdate>,
    /// Desired content with no stored counterpart
    pub insert: Vec<NewExample>,
}

/// Compute example changes from the stored rows and the desired list
///
/// An `Existing` entry whose id belongs to this record claims that row and
/// updates it only if text or translation differ. Every other entry (no id,
/// an id this record does not own, or an id already claimed) first claims an
/// unclaimed stored row with identical content, else becomes an insert.
/// Stored rows nobody claimed are deleted. Submitting the same desired state
/// twice therefore changes nothing the second time.
pub fn plan_examples(current: &[ExampleSentence], desired: &[ExampleInput]) -> ExamplePlan {
    let owned: HashSet<Uuid> = current.iter().map(|e| e.id).collect();
    let mut claimed: HashSet<Uuid> = HashSet::new();
    let mut plan = ExamplePlan::default();
    let mut unmatched: Vec<(&str, Option<&str>)> = Vec::new();

    for entry in desired {
        match entry {
            ExampleInput::Existing { id, text, translation } if owned.contains(id) && claimed.insert(*id) => {
                let unchanged = current
                    .iter()
                    .any(|e| e.id == *id && e.text == *text && e.translation == *translation);
                if !unchanged {
                    plan.update.push(ExampleUpdate {
                        id: *id,
                        text: text.clone(),
                        translation: translation.clone(),
                    });
                }
            }
            other => unmatched.push((other.text(), other.translation())),
        }
    }

    for (text, translation) in unmatched {
        let reusable = current.iter().find(|e| {
            !claimed.contains(&e.id) && e.text == text && e.translation.as_deref() == translation
        });
        match reusable {
            Some(existing) => {
                claimed.insert(existing.id);
            }
            None => plan.insert.push(NewExample {
                text: text.to_string(),
                translation: translation.map(str::to_string),
            }),
        }
    }

    plan.delete = current
        .iter()
        .filter(|e| !claimed.contains(&e.id))
        .map(|e| e.id)
        .collect();

    plan
}

/// Counts of what a reconciliation changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub tags_attached: usize,
    pub tags_detached: u64,
    pub examples_inserted: usize,
    pub examples_updated: u64,
    pub examples_deleted: u64,
    pub orphan_tags_deleted: u64,
}

/// Make the stored record `id` of `user_id` match `form`
///
/// All-or-nothing: any error rolls the whole transaction back. Returns
/// `Error::NotFound`, with nothing persisted, when the record does not exist
/// or belongs to another user.
pub async fn update_vocabulary(
    pool: &SqlitePool,
    user_id: &str,
    id: Uuid,
    form: &VocabularyForm,
) -> Result<ReconcileOutcome> {
    let mut tx = pool.begin().await?;
    let mut outcome = ReconcileOutcome::default();

    // Write before reading: a deferred transaction that reads first cannot
    // upgrade once another writer has committed past its snapshot
    let updated = db::vocabulary::update_fields(&mut *tx, user_id, &id, &form.fields, Utc::now()).await?;
    if updated == 0 {
        return Err(Error::NotFound(format!("Vocabulary {}", id)));
    }

    let current_tags = db::tags::tags_for_vocabulary(&mut *tx, &id)
        .await?
        .into_iter()
        .map(Tag::try_from)
        .collect::<Result<Vec<_>>>()?;
    let current_examples = db::examples::examples_for_vocabulary(&mut *tx, &id)
        .await?
        .into_iter()
        .map(ExampleSentence::try_from)
        .collect::<Result<Vec<_>>>()?;

    // Tags
    let tag_plan = plan_tags(&current_tags, &form.tags);
    outcome.tags_detached = db::tags::detach_tags(&mut *tx, &id, &tag_plan.detach).await?;
    for name in &tag_plan.attach_names {
        let tag = db::tags::find_or_create_tag(&mut *tx, name).await?;
        if db::tags::attach_tag(&mut *tx, &id, &tag.id).await? {
            outcome.tags_attached += 1;
        }
    }

    // Examples
    let example_plan = plan_examples(&current_examples, &form.examples);
    outcome.examples_deleted = db::examples::delete_examples(&mut *tx, &id, &example_plan.delete).await?;
    for update in &example_plan.update {
        let rows = db::examples::update_example(
            &mut *tx,
            &id,
            &update.id,
            &update.text,
            update.translation.as_deref(),
        )
        .await?;
        if rows == 0 {
            debug!("Example {} vanished before update, skipping", update.id);
        }
        outcome.examples_updated += rows;
    }
    for new in &example_plan.insert {
        db::examples::insert_example(&mut *tx, &id, &new.text, new.translation.as_deref()).await?;
        outcome.examples_inserted += 1;
    }

    outcome.orphan_tags_deleted = db::tags::delete_orphan_tags(&mut *tx).await?;

    tx.commit().await?;

    info!(
        vocabulary_id = %id,
        tags_attached = outcome.tags_attached,
        tags_detached = outcome.tags_detached,
        examples_inserted = outcome.examples_inserted,
        examples_updated = outcome.examples_updated,
        examples_deleted = outcome.examples_deleted,
        orphan_tags_deleted = outcome.orphan_tags_deleted,
        "Vocabulary updated"
    );

    Ok(outcome)
}
