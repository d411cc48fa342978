//! Visit history with JSON persistence.
//!
//! Records are kept in insertion order and shown newest first. The backing
//! file is rewritten in full after every change; a missing or unreadable file
//! is treated as an empty history.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::errors::PersistenceError;
use crate::utils::{local_timestamp, parse_timestamp};

/// One successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// URL as fetched.
    pub url: String,
    /// Page title at fetch time.
    pub title: String,
    /// Local time, `%Y-%m-%d %H:%M:%S`.
    pub timestamp: String,
}

impl HistoryRecord {
    /// Creates a record stamped with the current local time.
    #[must_use]
    pub fn now(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            timestamp: local_timestamp(),
        }
    }

    /// The timestamp as a date-time, if it is well formed.
    #[must_use]
    pub fn visited_at(&self) -> Option<chrono::NaiveDateTime> {
        parse_timestamp(&self.timestamp).ok()
    }
}

/// Ordered visit log, optionally backed by a JSON file.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    path: Option<PathBuf>,
    records: Vec<HistoryRecord>,
}

impl HistoryLog {
    /// A log that is never written to disk.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads the log stored at `path`.
    ///
    /// Never fails: a missing file starts an empty log, and an unreadable or
    /// corrupt one is logged and replaced on the next write.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = match Self::read_records(&path) {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "Starting with empty history");
                Vec::new()
            }
        };
        debug!(path = %path.display(), count = records.len(), "History loaded");
        Self {
            path: Some(path),
            records,
        }
    }

    fn read_records(path: &Path) -> Result<Vec<HistoryRecord>, PersistenceError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PersistenceError::read(path, e)),
        };
        serde_json::from_str(&raw).map_err(|e| PersistenceError::read(path, e))
    }

    /// Backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Appends a record in memory without writing.
    pub fn append(&mut self, record: HistoryRecord) {
        self.records.push(record);
    }

    /// Appends a visit stamped now and persists the log.
    ///
    /// The record stays in memory even if the write fails.
    ///
    /// # Errors
    ///
    /// [`PersistenceError::WriteFailed`] when the file cannot be written.
    pub fn record_visit(
        &mut self,
        url: impl Into<String>,
        title: impl Into<String>,
    ) -> Result<(), PersistenceError> {
        let record = HistoryRecord::now(url, title);
        info!(url = %record.url, title = %record.title, "Recorded visit");
        self.append(record);
        self.persist()
    }

    /// Removes every record and persists the empty log.
    ///
    /// # Errors
    ///
    /// [`PersistenceError::WriteFailed`] when the file cannot be written.
    pub fn clear(&mut self) -> Result<(), PersistenceError> {
        self.records.clear();
        info!("History cleared");
        self.persist()
    }

    /// Records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// Records newest first.
    pub fn newest_first(&self) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter().rev()
    }

    /// The most recent record.
    #[must_use]
    pub fn latest(&self) -> Option<&HistoryRecord> {
        self.records.last()
    }

    /// Record at `position` in the newest-first listing, counting from 1.
    #[must_use]
    pub fn nth_newest(&self, position: usize) -> Option<&HistoryRecord> {
        position
            .checked_sub(1)
            .and_then(|offset| self.newest_first().nth(offset))
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when no visit is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Display text for the history pane.
    #[must_use]
    pub fn render(&self) -> String {
        if self.records.is_empty() {
            return "No scraping history yet.".to_string();
        }
        let mut out = String::from("Scraping History:\n\n");
        for (i, record) in self.newest_first().enumerate() {
            let _ = write!(
                out,
                "{}. {} - {}\n   Time: {}\n\n",
                i + 1,
                record.url,
                record.title,
                record.timestamp
            );
        }
        out
    }

    /// Rewrites the backing file with the full log.
    ///
    /// # Errors
    ///
    /// [`PersistenceError::WriteFailed`] on serialization or I/O failure.
    pub fn persist(&self) -> Result<(), PersistenceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json =
            serde_json::to_string_pretty(&self.records).map_err(|e| PersistenceError::write(path, e))?;
        std::fs::write(path, json).map_err(|e| {
            warn!(path = %path.display(), error = %e, "Failed to write history");
            PersistenceError::write(path, e)
        })?;
        debug!(path = %path.display(), count = self.records.len(), "History written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(url: &str, title: &str, ts: &str) -> HistoryRecord {
        HistoryRecord {
            url: url.to_string(),
            title: title.to_string(),
            timestamp: ts.to_string(),
        }
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(HistoryLog::in_memory().render(), "No scraping history yet.");
    }

    #[test]
    fn test_render_newest_first() {
        let mut log = HistoryLog::in_memory();
        log.append(record("https://a.test", "A", "2024-01-01 10:00:00"));
        log.append(record("https://b.test", "B", "2024-01-02 11:30:00"));

        assert_eq!(
            log.render(),
            "Scraping History:\n\n\
             1. https://b.test - B\n   Time: 2024-01-02 11:30:00\n\n\
             2. https://a.test - A\n   Time: 2024-01-01 10:00:00\n\n"
        );
        assert_eq!(log.latest().unwrap().url, "https://b.test");
        assert_eq!(log.nth_newest(2).unwrap().url, "https://a.test");
        assert!(log.nth_newest(0).is_none());
        assert!(log.nth_newest(3).is_none());
    }

    #[test]
    fn test_persist_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut log = HistoryLog::load(&path);
        assert!(log.is_empty());
        log.record_visit("https://example.com", "Example").unwrap();
        log.record_visit("https://example.org", "No title").unwrap();

        let reloaded = HistoryLog::load(&path);
        assert_eq!(reloaded.records(), log.records());
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.records()[0].visited_at().is_some());
    }

    #[test]
    fn test_file_is_json_array_of_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut log = HistoryLog::load(&path);
        log.append(record("u", "t", "2024-05-05 05:05:05"));
        log.persist().unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{"url": "u", "title": "t", "timestamp": "2024-05-05 05:05:05"}])
        );
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{not json").unwrap();

        let mut log = HistoryLog::load(&path);
        assert!(log.is_empty());

        log.record_visit("https://x.test", "X").unwrap();
        assert_eq!(HistoryLog::load(&path).len(), 1);
    }

    #[test]
    fn test_clear_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut log = HistoryLog::load(&path);
        log.record_visit("https://x.test", "X").unwrap();

        log.clear().unwrap();
        assert!(log.is_empty());
        assert!(HistoryLog::load(&path).is_empty());
    }

    #[test]
    fn test_write_failure_keeps_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("history.json");
        let mut log = HistoryLog::load(&path);

        let err = log.record_visit("https://x.test", "X").unwrap_err();
        assert!(matches!(err, PersistenceError::WriteFailed { .. }));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_in_memory_never_writes() {
        let mut log = HistoryLog::in_memory();
        log.record_visit("https://x.test", "X").unwrap();
        assert!(log.path().is_none());
        assert_eq!(log.len(), 1);
    }
}
