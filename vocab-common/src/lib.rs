//! # Vocabulary Common Library
//!
//! Shared code for the vocabulary notebook service including:
//! - Error type used by the store and reconciler
//! - Configuration loading and resolution
//! - Database bootstrap, migrations and row models
//! - View invalidation events (EventBus)
//! - Session token hashing

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod events;

pub use error::{Error, Result};
