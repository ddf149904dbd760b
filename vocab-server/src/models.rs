//! Domain types for vocabulary records
//!
//! Request payloads are resolved into tagged variants at the deserialization
//! boundary: an entry either refers to an `Existing` row by id or describes a
//! `New` one. Nothing downstream inspects raw optional ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use vocab_common::db::{ExampleRow, TagRow, UserRow, VocabularyRow};
use vocab_common::{Error, Result};

// ============================================================================
// Classification enums
// ============================================================================

/// Kind of vocabulary record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    Word,
    Phrase,
    Grammar,
}

impl Genre {
    pub const ALL: [Genre; 3] = [Genre::Word, Genre::Phrase, Genre::Grammar];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Word => "word",
            Genre::Phrase => "phrase",
            Genre::Grammar => "grammar",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Genre::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown genre '{}'", s)))
    }
}

/// Part of speech, meaningful for `word` records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Pronoun,
    Preposition,
    Conjunction,
    Interjection,
    Determiner,
    Phrase,
}

impl PartOfSpeech {
    pub const ALL: [PartOfSpeech; 10] = [
        PartOfSpeech::Noun,
        PartOfSpeech::Verb,
        PartOfSpeech::Adjective,
        PartOfSpeech::Adverb,
        PartOfSpeech::Pronoun,
        PartOfSpeech::Preposition,
        PartOfSpeech::Conjunction,
        PartOfSpeech::Interjection,
        PartOfSpeech::Determiner,
        PartOfSpeech::Phrase,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Verb => "verb",
            PartOfSpeech::Adjective => "adjective",
            PartOfSpeech::Adverb => "adverb",
            PartOfSpeech::Pronoun => "pronoun",
            PartOfSpeech::Preposition => "preposition",
            PartOfSpeech::Conjunction => "conjunction",
            PartOfSpeech::Interjection => "interjection",
            PartOfSpeech::Determiner => "determiner",
            PartOfSpeech::Phrase => "phrase",
        }
    }
}

impl FromStr for PartOfSpeech {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PartOfSpeech::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown part of speech '{}'", s)))
    }
}

/// Form selectors send `null`, `""` or `"none"` for "no part of speech"
fn deserialize_part_of_speech<'de, D>(deserializer: D) -> std::result::Result<Option<PartOfSpeech>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") | Some("none") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

// ============================================================================
// Inflected forms
// ============================================================================

/// Optional inflected forms; which ones apply depends on part of speech
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inflections {
    #[serde(default)]
    pub plural: Option<String>,
    #[serde(default)]
    pub comparative: Option<String>,
    #[serde(default)]
    pub superlative: Option<String>,
    #[serde(default)]
    pub present_tense: Option<String>,
    #[serde(default)]
    pub third_person_singular: Option<String>,
    #[serde(default)]
    pub past_tense: Option<String>,
    #[serde(default)]
    pub past_participle: Option<String>,
    #[serde(default)]
    pub present_participle: Option<String>,
    #[serde(default)]
    pub possessive: Option<String>,
    #[serde(default)]
    pub objective: Option<String>,
    #[serde(default)]
    pub reflexive: Option<String>,
}

/// One displayable inflected form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InflectedForm {
    pub field: &'static str,
    pub value: String,
}

impl Inflections {
    /// Non-empty forms that apply to this genre and part of speech
    ///
    /// Only `word` records carry forms. Stored values for other parts of
    /// speech are kept but not shown.
    pub fn applicable(&self, genre: Genre, part_of_speech: Option<PartOfSpeech>) -> Vec<InflectedForm> {
        if genre != Genre::Word {
            return Vec::new();
        }

        let candidates: Vec<(&'static str, &Option<String>)> = match part_of_speech {
            Some(PartOfSpeech::Noun) => vec![("plural", &self.plural)],
            Some(PartOfSpeech::Verb) => vec![
                ("presentTense", &self.present_tense),
                ("thirdPersonSingular", &self.third_person_singular),
                ("pastTense", &self.past_tense),
                ("pastParticiple", &self.past_participle),
                ("presentParticiple", &self.present_participle),
            ],
            Some(PartOfSpeech::Adjective) | Some(PartOfSpeech::Adverb) => vec![
                ("comparative", &self.comparative),
                ("superlative", &self.superlative),
            ],
            Some(PartOfSpeech::Pronoun) => vec![
                ("possessive", &self.possessive),
                ("objective", &self.objective),
                ("reflexive", &self.reflexive),
            ],
            _ => Vec::new(),
        };

        candidates
            .into_iter()
            .filter_map(|(field, value)| {
                value
                    .as_deref()
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| InflectedForm {
                        field,
                        value: v.to_string(),
                    })
            })
            .collect()
    }
}

// ============================================================================
// Request payloads
// ============================================================================

/// Scalar fields of a vocabulary record as submitted by the form
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyFields {
    pub content: String,
    pub genre: Genre,
    #[serde(default, deserialize_with = "deserialize_part_of_speech")]
    pub part_of_speech: Option<PartOfSpeech>,
    pub meaning: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub inflections: Inflections,
}

/// Desired tag: an already-known tag id, or a name to find-or-create
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawTag")]
pub enum TagInput {
    Existing { id: Uuid, name: String },
    New { name: String },
}

impl TagInput {
    pub fn name(&self) -> &str {
        match self {
            TagInput::Existing { name, .. } | TagInput::New { name } => name,
        }
    }
}

/// Wire shapes accepted for a tag: a bare name or `{id?, name}`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTag {
    Name(String),
    Entry {
        #[serde(default)]
        id: Option<String>,
        name: String,
    },
}

impl From<RawTag> for TagInput {
    fn from(raw: RawTag) -> Self {
        match raw {
            RawTag::Name(name) => TagInput::New { name },
            RawTag::Entry { id, name } => match id.as_deref().map(Uuid::parse_str) {
                Some(Ok(id)) => TagInput::Existing { id, name },
                _ => TagInput::New { name },
            },
        }
    }
}

/// Desired example sentence: update an existing row by id, or a new one
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawExample")]
pub enum ExampleInput {
    Existing {
        id: Uuid,
        text: String,
        translation: Option<String>,
    },
    New {
        text: String,
        translation: Option<String>,
    },
}

impl ExampleInput {
    pub fn text(&self) -> &str {
        match self {
            ExampleInput::Existing { text, .. } | ExampleInput::New { text, .. } => text,
        }
    }

    pub fn translation(&self) -> Option<&str> {
        match self {
            ExampleInput::Existing { translation, .. } | ExampleInput::New { translation, .. } => {
                translation.as_deref()
            }
        }
    }
}

#[derive(Deserialize)]
struct RawExample {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    translation: Option<String>,
}

impl From<RawExample> for ExampleInput {
    fn from(raw: RawExample) -> Self {
        match raw.id.as_deref().map(Uuid::parse_str) {
            Some(Ok(id)) => ExampleInput::Existing {
                id,
                text: raw.text,
                translation: raw.translation,
            },
            _ => ExampleInput::New {
                text: raw.text,
                translation: raw.translation,
            },
        }
    }
}

/// Full add/edit form submission
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VocabularyForm {
    #[serde(flatten)]
    pub fields: VocabularyFields,
    #[serde(default)]
    pub examples: Vec<ExampleInput>,
    #[serde(default)]
    pub tags: Vec<TagInput>,
}

impl VocabularyForm {
    /// Schema validation performed before the form reaches the store
    pub fn validate(&self) -> Result<()> {
        if self.fields.content.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Enter a word, phrase or grammar point".to_string(),
            ));
        }
        if self.fields.meaning.trim().is_empty() {
            return Err(Error::InvalidInput("Enter a meaning".to_string()));
        }
        for example in &self.examples {
            let has_text = !example.text().trim().is_empty();
            let has_translation = example.translation().is_some_and(|t| !t.trim().is_empty());
            if has_text && !has_translation {
                return Err(Error::InvalidInput(
                    "An example sentence needs a translation".to_string(),
                ));
            }
        }
        if self.tags.iter().any(|t| t.name().trim().is_empty()) {
            return Err(Error::InvalidInput("Tag names must not be blank".to_string()));
        }
        Ok(())
    }
}

/// Listing filters (`?genre=&partOfSpeech=&q=`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilter {
    #[serde(default)]
    pub genre: Option<Genre>,
    #[serde(default, deserialize_with = "deserialize_part_of_speech")]
    pub part_of_speech: Option<PartOfSpeech>,
    #[serde(default)]
    pub q: Option<String>,
}

// ============================================================================
// Domain records
// ============================================================================

fn parse_uuid(value: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::Internal(format!("Invalid {} id '{}': {}", what, value, e)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
}

impl TryFrom<TagRow> for Tag {
    type Error = Error;

    fn try_from(row: TagRow) -> Result<Self> {
        Ok(Tag {
            id: parse_uuid(&row.id, "tag")?,
            name: row.name,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExampleSentence {
    pub id: Uuid,
    pub text: String,
    pub translation: Option<String>,
}

impl TryFrom<ExampleRow> for ExampleSentence {
    type Error = Error;

    fn try_from(row: ExampleRow) -> Result<Self> {
        Ok(ExampleSentence {
            id: parse_uuid(&row.id, "example")?,
            text: row.text,
            translation: row.translation,
        })
    }
}

/// A persisted vocabulary record without its child collections
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vocabulary {
    pub id: Uuid,
    pub user_id: String,
    pub genre: Genre,
    pub content: String,
    pub part_of_speech: Option<PartOfSpeech>,
    pub meaning: String,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub inflections: Inflections,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<VocabularyRow> for Vocabulary {
    type Error = Error;

    fn try_from(row: VocabularyRow) -> Result<Self> {
        let part_of_speech = row
            .part_of_speech
            .as_deref()
            .map(PartOfSpeech::from_str)
            .transpose()
            .map_err(|e| Error::Internal(e.to_string()))?;
        let genre = row
            .genre
            .parse::<Genre>()
            .map_err(|e| Error::Internal(e.to_string()))?;

        Ok(Vocabulary {
            id: parse_uuid(&row.id, "vocabulary")?,
            user_id: row.user_id,
            genre,
            content: row.content,
            part_of_speech,
            meaning: row.meaning,
            notes: row.notes,
            inflections: Inflections {
                plural: row.plural,
                comparative: row.comparative,
                superlative: row.superlative,
                present_tense: row.present_tense,
                third_person_singular: row.third_person_singular,
                past_tense: row.past_tense,
                past_participle: row.past_participle,
                present_participle: row.present_participle,
                possessive: row.possessive,
                objective: row.objective,
                reflexive: row.reflexive,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Listing entry: record plus tags
#[derive(Debug, Clone, Serialize)]
pub struct VocabularySummary {
    #[serde(flatten)]
    pub vocabulary: Vocabulary,
    pub tags: Vec<Tag>,
}

/// Detail view: record, tags, examples and applicable inflected forms
#[derive(Debug, Clone, Serialize)]
pub struct VocabularyDetail {
    #[serde(flatten)]
    pub vocabulary: Vocabulary,
    pub tags: Vec<Tag>,
    pub examples: Vec<ExampleSentence>,
    pub forms: Vec<InflectedForm>,
}

/// Per-genre counts for the listing sidebar
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VocabularyStats {
    pub total: i64,
    pub word: i64,
    pub phrase: i64,
    pub grammar: i64,
}

/// Profile of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            name: row.name,
        }
    }
}

// ============================================================================
// Practice deck
// ============================================================================

/// Which side of the card is shown first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PracticeMode {
    /// Show the content, ask for the meaning
    #[default]
    Definition,
    /// Show the meaning, ask for the content
    Word,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeCard {
    pub id: Uuid,
    pub genre: Genre,
    pub part_of_speech: Option<PartOfSpeech>,
    pub prompt: String,
    pub answer: String,
    pub examples: Vec<ExampleSentence>,
}

// ============================================================================
// Action result
// ============================================================================

/// Result body of every mutation: `{success: true}` or `{success: false, error}`
#[derive(Debug, Clone, Serialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<Vocabulary>,
}

impl ActionResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            vocabulary: None,
        }
    }

    pub fn created(vocabulary: Vocabulary) -> Self {
        Self {
            vocabulary: Some(vocabulary),
            ..Self::ok()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            vocabulary: None,
        }
    }
}
