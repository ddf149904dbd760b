//! Vocabulary operations on top of the record store

pub mod practice;
pub mod profile;
pub mod reconcile;
pub mod vocabulary;

pub use reconcile::{update_vocabulary, ReconcileOutcome};
