//! Flashcard practice deck

use crate::db;
use crate::models::{ExampleSentence, ListFilter, PracticeCard, PracticeMode, Vocabulary};
use rand::seq::SliceRandom;
use sqlx::SqlitePool;
use vocab_common::Result;

/// Build a deck from the user's records
///
/// `Definition` shows the content and asks for the meaning; `Word` the reverse.
/// Without `shuffle` cards keep listing order (most recently updated first).
pub async fn practice_deck(
    pool: &SqlitePool,
    user_id: &str,
    mode: PracticeMode,
    filter: &ListFilter,
    shuffle: bool,
) -> Result<Vec<PracticeCard>> {
    let mut conn = pool.acquire().await?;

    let rows = db::vocabulary::list_for_user(&mut *conn, user_id, filter).await?;
    let mut examples = db::examples::examples_for_user(&mut *conn, user_id).await?;

    let mut deck = rows
        .into_iter()
        .map(|row| -> Result<PracticeCard> {
            let record_examples = examples
                .remove(&row.id)
                .unwrap_or_default()
                .into_iter()
                .map(ExampleSentence::try_from)
                .collect::<Result<Vec<_>>>()?;
            Ok(card(Vocabulary::try_from(row)?, record_examples, mode))
        })
        .collect::<Result<Vec<_>>>()?;

    if shuffle {
        deck.shuffle(&mut rand::thread_rng());
    }
    Ok(deck)
}

fn card(vocabulary: Vocabulary, examples: Vec<ExampleSentence>, mode: PracticeMode) -> PracticeCard {
    let (prompt, answer) = match mode {
        PracticeMode::Definition => (vocabulary.content, vocabulary.meaning),
        PracticeMode::Word => (vocabulary.meaning, vocabulary.content),
    };

    PracticeCard {
        id: vocabulary.id,
        genre: vocabulary.genre,
        part_of_speech: vocabulary.part_of_speech,
        prompt,
        answer,
        examples,
    }
}
