//! Line-delimited file storage
//!
//! History and forum lists are kept as plain text: one record per line,
//! newline terminated, no escaping.

use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{read_lines, write_lines};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// File-backed storage
#[derive(Debug, Clone)]
pub struct FileStorage {
    history_path: PathBuf,
    forums_path: Option<PathBuf>,
}

impl FileStorage {
    /// Creates a new file storage
    ///
    /// # Arguments
    ///
    /// * `history_path` - File holding one published message per line
    /// * `forums_path` - Optional file holding one forum id per line
    pub fn new(history_path: impl Into<PathBuf>, forums_path: Option<PathBuf>) -> Self {
        Self {
            history_path: history_path.into(),
            forums_path,
        }
    }

    /// Path of the history file
    pub fn history_path(&self) -> &Path {
        &self.history_path
    }

    /// Path of the forum-list file, if one is configured
    pub fn forums_path(&self) -> Option<&Path> {
        self.forums_path.as_deref()
    }
}

/// Reads a line file, treating a missing file as empty
fn read_line_file(path: &Path) -> StorageResult<Vec<String>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("{} does not exist yet", path.display());
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(StorageError::Read {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    read_lines(BufReader::new(file)).map_err(|e| StorageError::Read {
        path: path.to_path_buf(),
        source: e,
    })
}

impl Storage for FileStorage {
    fn load_history(&self) -> StorageResult<Vec<String>> {
        read_line_file(&self.history_path)
    }

    fn save_history(&mut self, entries: &[String]) -> StorageResult<()> {
        let write = || -> std::io::Result<()> {
            // Written next to the target, then renamed over it
            let tmp_path = self.history_path.with_extension("tmp");
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            write_lines(&mut writer, entries)?;
            writer.flush()?;
            drop(writer);
            std::fs::rename(&tmp_path, &self.history_path)
        };

        write().map_err(|e| StorageError::Write {
            path: self.history_path.clone(),
            source: e,
        })?;

        tracing::debug!(
            "Saved {} history entries to {}",
            entries.len(),
            self.history_path.display()
        );
        Ok(())
    }

    fn load_forums(&self) -> StorageResult<Vec<String>> {
        match &self.forums_path {
            Some(path) => read_line_file(path),
            None => Ok(Vec::new()),
        }
    }
}
