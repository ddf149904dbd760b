//! HTTP API handlers for vocab-server

pub mod extract;
pub mod health;
pub mod practice;
pub mod profile;
pub mod session;
pub mod sse;
pub mod vocabulary;

pub use health::health_routes;
pub use practice::get_practice_deck;
pub use profile::{get_profile, register, update_profile};
pub use session::{require_session, CurrentUser};
pub use sse::event_stream;
pub use vocabulary::{
    add_vocabulary, delete_vocabulary, get_vocabulary, get_vocabulary_stats, list_vocabularies,
    update_vocabulary,
};
