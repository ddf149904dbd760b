//! Record store queries
//!
//! Functions take `&mut SqliteConnection` so the same query serves a pooled
//! connection and an open transaction (`&mut *tx`).

pub mod examples;
pub mod tags;
pub mod users;
pub mod vocabulary;
