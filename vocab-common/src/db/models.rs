//! Database row models
//!
//! Plain mirrors of table rows. Domain conversion (enums, UUIDs) happens in
//! the server crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VocabularyRow {
    pub id: String,
    pub user_id: String,
    pub genre: String,
    pub content: String,
    pub part_of_speech: Option<String>,
    pub meaning: String,
    pub notes: Option<String>,
    pub plural: Option<String>,
    pub comparative: Option<String>,
    pub superlative: Option<String>,
    pub present_tense: Option<String>,
    pub third_person_singular: Option<String>,
    pub past_tense: Option<String>,
    pub past_participle: Option<String>,
    pub present_participle: Option<String>,
    pub possessive: Option<String>,
    pub objective: Option<String>,
    pub reflexive: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExampleRow {
    pub id: String,
    pub vocabulary_id: String,
    pub text: String,
    pub translation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TagRow {
    pub id: String,
    pub name: String,
}
