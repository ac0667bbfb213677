//! In-memory storage backend
//!
//! Used for dry runs (nothing is written back to disk) and in tests.

use crate::storage::traits::{Storage, StorageResult};

/// Storage that keeps everything in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    history: Vec<String>,
    forums: Vec<String>,
    saves: usize,
}

impl MemoryStorage {
    /// Creates an empty in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-memory storage seeded with history and forums
    pub fn with_contents(history: Vec<String>, forums: Vec<String>) -> Self {
        Self {
            history,
            forums,
            saves: 0,
        }
    }

    /// The history as last saved
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Number of times `save_history` was called
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl Storage for MemoryStorage {
    fn load_history(&self) -> StorageResult<Vec<String>> {
        Ok(self.history.clone())
    }

    fn save_history(&mut self, entries: &[String]) -> StorageResult<()> {
        self.history = entries.to_vec();
        self.saves += 1;
        Ok(())
    }

    fn load_forums(&self) -> StorageResult<Vec<String>> {
        Ok(self.forums.clone())
    }
}
