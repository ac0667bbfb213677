//! Storage module for persisting bot state
//!
//! This module handles everything the bot keeps between runs:
//! - The bounded history of published messages
//! - The optional forum list
//! - Line-delimited file and in-memory backends

mod file;
mod history;
mod memory;
mod traits;

pub use file::FileStorage;
pub use history::{HistoryStore, DEFAULT_MAX_HISTORY};
pub use memory::MemoryStorage;
pub use traits::{Storage, StorageError, StorageResult};

use std::io::{self, BufRead, Write};

/// Reads newline-delimited records
///
/// Surrounding whitespace (including a trailing `\r`) is stripped and blank
/// lines are skipped. Order is preserved.
pub fn read_lines<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }
    Ok(lines)
}

/// Writes records one per line, each newline terminated
pub fn write_lines<W: Write, S: AsRef<str>>(writer: &mut W, lines: &[S]) -> io::Result<()> {
    for line in lines {
        writeln!(writer, "{}", line.as_ref())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_lines_skips_blanks_and_crlf() {
        let input = "first\r\n\n  second \nthird";
        let lines = read_lines(input.as_bytes()).unwrap();
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_write_lines_terminates_every_line() {
        let mut out = Vec::new();
        write_lines(&mut out, &["a", "b"]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_write_nothing() {
        let mut out = Vec::new();
        write_lines::<_, &str>(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }
}
