//! Bounded history of published messages
//!
//! The history is the only dedup gate in the bot. It keeps messages in
//! recency order (front = most recent) alongside a hash index for
//! membership tests, and evicts the oldest half in one batch once full.

use crate::storage::traits::{Storage, StorageResult};
use crate::storage::{read_lines, write_lines};
use std::collections::{HashSet, VecDeque};
use std::io::{self, BufRead, Write};

/// Default ceiling on remembered messages (one week of hourly runs)
pub const DEFAULT_MAX_HISTORY: usize = 168;

/// Bounded, order-preserving set of previously published messages
#[derive(Debug, Clone)]
pub struct HistoryStore {
    /// Messages, most recent first
    entries: VecDeque<String>,

    /// Membership index over `entries`
    index: HashSet<String>,

    /// Maximum number of entries kept
    max_history: usize,
}

impl HistoryStore {
    /// Creates an empty history
    ///
    /// `max_history` is clamped to at least 2 so a batch eviction always
    /// removes at least one entry.
    pub fn new(max_history: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            index: HashSet::new(),
            max_history: max_history.max(2),
        }
    }

    /// Rebuilds a history from entries listed most recent first
    ///
    /// Duplicates keep their first (most recent) position. If there are more
    /// entries than the ceiling allows, only the newest are kept.
    pub fn from_entries<I, S>(max_history: usize, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut store = Self::new(max_history);
        for entry in entries {
            if store.entries.len() >= store.max_history {
                break;
            }
            let entry = entry.into();
            if store.index.insert(entry.clone()) {
                store.entries.push_back(entry);
            }
        }
        store
    }

    /// Reconstructs a history from a line-delimited reader
    pub fn load_from<R: BufRead>(max_history: usize, reader: R) -> io::Result<Self> {
        Ok(Self::from_entries(max_history, read_lines(reader)?))
    }

    /// Serializes the history one entry per line, most recent first
    pub fn persist_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let (front, back) = self.entries.as_slices();
        write_lines(writer, front)?;
        write_lines(writer, back)
    }

    /// Loads the history from a storage backend
    ///
    /// A missing or unreadable history is not fatal: the error is logged and
    /// an empty history is returned.
    pub fn load(max_history: usize, storage: &dyn Storage) -> Self {
        match storage.load_history() {
            Ok(entries) => {
                let store = Self::from_entries(max_history, entries);
                tracing::info!("Loaded {} history entries", store.len());
                store
            }
            Err(e) => {
                tracing::warn!("Could not load history, starting empty: {}", e);
                Self::new(max_history)
            }
        }
    }

    /// Writes the history to a storage backend
    pub fn persist(&self, storage: &mut dyn Storage) -> StorageResult<()> {
        storage.save_history(&self.entries())
    }

    /// Returns true if `message` has been recorded
    pub fn contains(&self, message: &str) -> bool {
        self.index.contains(message)
    }

    /// Records `message` if it is not already present
    ///
    /// Returns `true` if the message was added and `false` (with no
    /// mutation) if it was already recorded. A full history is batch-evicted
    /// before the new entry goes in.
    pub fn try_add(&mut self, message: &str) -> bool {
        if self.index.contains(message) {
            return false;
        }

        self.evict_if_full();
        self.index.insert(message.to_string());
        self.entries.push_front(message.to_string());
        true
    }

    /// Evicts the oldest half of the history once it has reached the ceiling
    ///
    /// Returns the number of evicted entries.
    pub fn evict_if_full(&mut self) -> usize {
        if self.entries.len() < self.max_history {
            return 0;
        }

        let evict = self.max_history / 2;
        let keep = self.entries.len() - evict;
        for old in self.entries.drain(keep..) {
            self.index.remove(&old);
        }

        tracing::debug!(
            "History reached {} entries, evicted {} oldest",
            self.max_history,
            evict
        );
        evict
    }

    /// Entries, most recent first
    pub fn entries(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    /// Iterates entries, most recent first
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Number of recorded messages
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The configured ceiling
    pub fn max_history(&self) -> usize {
        self.max_history
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_try_add_once_per_message() {
        let mut history = HistoryStore::default();

        assert!(history.try_add("tldr one."));
        assert!(!history.try_add("tldr one."));
        assert_eq!(history.len(), 1);
        assert!(history.contains("tldr one."));
        assert!(!history.contains("tldr two."));
    }

    #[test]
    fn test_most_recent_first() {
        let mut history = HistoryStore::default();
        history.try_add("a");
        history.try_add("b");
        history.try_add("c");

        assert_eq!(history.entries(), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_batch_eviction_of_oldest_half() {
        let mut history = HistoryStore::new(10);
        for i in 0..10 {
            assert!(history.try_add(&format!("m{}", i)));
        }
        assert_eq!(history.len(), 10);

        // The eleventh insertion evicts m0..m4 together
        assert!(history.try_add("m10"));
        assert_eq!(history.len(), 6);
        for i in 0..5 {
            assert!(!history.contains(&format!("m{}", i)));
        }
        for i in 5..=10 {
            assert!(history.contains(&format!("m{}", i)));
        }

        // An evicted message may be recorded again
        assert!(history.try_add("m0"));
    }

    #[test]
    fn test_default_ceiling_evicts_84() {
        let mut history = HistoryStore::default();
        for i in 0..DEFAULT_MAX_HISTORY {
            history.try_add(&i.to_string());
        }
        assert_eq!(history.len(), 168);

        history.try_add("next");
        assert_eq!(history.len(), 168 - 84 + 1);
        assert!(!history.contains("83"));
        assert!(history.contains("84"));
    }

    #[test]
    fn test_evict_if_full_noop_below_ceiling() {
        let mut history = HistoryStore::new(4);
        history.try_add("a");
        history.try_add("b");
        assert_eq!(history.evict_if_full(), 0);
        assert_eq!(history.len(), 2);

        history.try_add("c");
        history.try_add("d");
        assert_eq!(history.evict_if_full(), 2);
        assert_eq!(history.entries(), vec!["d", "c"]);
    }

    #[test]
    fn test_duplicate_does_not_trigger_eviction() {
        let mut history = HistoryStore::new(2);
        history.try_add("a");
        history.try_add("b");
        assert!(!history.try_add("b"));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_persist_reload_preserves_recency() {
        let mut history = HistoryStore::default();
        history.try_add("a");
        history.try_add("b");
        history.try_add("c");

        let mut buf = Vec::new();
        history.persist_to(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf.clone()).unwrap(), "c\nb\na\n");

        let mut reloaded = HistoryStore::load_from(DEFAULT_MAX_HISTORY, &buf[..]).unwrap();
        assert!(!reloaded.try_add("c"));
        assert!(reloaded.try_add("d"));

        let mut out = Vec::new();
        reloaded.persist_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "d\nc\nb\na\n");
    }

    #[test]
    fn test_from_entries_dedups_and_trims() {
        let history = HistoryStore::from_entries(4, ["e", "d", "e", "c", "b", "a"]);
        assert_eq!(history.entries(), vec!["e", "d", "c", "b"]);
    }

    #[test]
    fn test_load_and_persist_through_storage() {
        let mut storage =
            MemoryStorage::with_contents(vec!["y".to_string(), "x".to_string()], vec![]);
        let mut history = HistoryStore::load(DEFAULT_MAX_HISTORY, &storage);
        assert_eq!(history.len(), 2);

        history.try_add("z");
        history.persist(&mut storage).unwrap();
        assert_eq!(storage.history(), ["z", "y", "x"]);
    }

    #[test]
    fn test_tiny_ceiling_is_clamped() {
        let mut history = HistoryStore::new(0);
        assert_eq!(history.max_history(), 2);
        history.try_add("a");
        history.try_add("b");
        history.try_add("c");
        assert_eq!(history.entries(), vec!["c", "b"]);
    }
}
