//! Round-robin scheduler over the forum list
//!
//! The scheduler hands out forum identifiers one at a time, wrapping back to
//! the first forum after the last. The cursor lives only in memory, so every
//! process start begins at the first forum.

use crate::BotError;

/// Built-in forum list used when no forum file is present
pub const DEFAULT_FORUMS: [&str; 6] = [
    "askreddit",
    "explainlikeimfive",
    "todayilearned",
    "askscience",
    "personalfinance",
    "relationships",
];

/// Cyclic cursor over a non-empty list of forum identifiers
#[derive(Debug, Clone)]
pub struct ForumScheduler {
    /// Forum identifiers in crawl order
    forums: Vec<String>,

    /// Index of the forum returned by the next call to `next`
    cursor: usize,
}

impl ForumScheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `forums` - Forum identifiers in crawl order
    ///
    /// # Returns
    ///
    /// * `Ok(ForumScheduler)` - Scheduler positioned at the first forum
    /// * `Err(BotError::NoForums)` - The list was empty
    pub fn new(forums: Vec<String>) -> Result<Self, BotError> {
        if forums.is_empty() {
            return Err(BotError::NoForums);
        }

        Ok(Self { forums, cursor: 0 })
    }

    /// Returns the next forum and advances the cursor by one
    pub fn next_forum(&mut self) -> &str {
        let index = self.cursor;
        self.cursor = (self.cursor + 1) % self.forums.len();
        &self.forums[index]
    }

    /// Returns the forum the next call to `next_forum` will yield
    pub fn peek(&self) -> &str {
        &self.forums[self.cursor]
    }

    /// Number of forums in the rotation
    pub fn len(&self) -> usize {
        self.forums.len()
    }

    /// Always false; an empty scheduler cannot be constructed
    pub fn is_empty(&self) -> bool {
        self.forums.is_empty()
    }

    /// All forums in crawl order
    pub fn forums(&self) -> &[String] {
        &self.forums
    }
}

/// Picks the forum list to crawl
///
/// Loaded forums win when there are any; otherwise the configured defaults
/// are used.
pub fn resolve_forums(loaded: Vec<String>, defaults: &[String]) -> Vec<String> {
    if loaded.is_empty() {
        tracing::info!("No forum list found, using {} default forums", defaults.len());
        defaults.to_vec()
    } else {
        loaded
    }
}
