//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Every record set is a flat list of lines. The backend decides where the
/// lines live; ordering is always preserved exactly as given.
pub trait Storage: Send {
    // ===== History =====

    /// Loads the published-message history, most recent first
    ///
    /// A backend with no history yet returns an empty list, not an error.
    fn load_history(&self) -> StorageResult<Vec<String>>;

    /// Replaces the stored history with `entries` (most recent first)
    fn save_history(&mut self, entries: &[String]) -> StorageResult<()>;

    // ===== Forums =====

    /// Loads the configured forum identifiers
    ///
    /// An absent forum list is reported as an empty list so the caller can
    /// fall back to its defaults.
    fn load_forums(&self) -> StorageResult<Vec<String>>;
}
