/// Caption log persistence
///
/// Each image has one JSON caption log next to it. Logs are append-only:
/// records are never edited or removed, and an image is excluded by
/// appending a `DELETE_ME` tombstone. Every write rewrites the whole file
/// through a temporary sibling and a rename, so a reader sees either the
/// old log or the new one.
use chrono::Local;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::data::{CaptionLog, CaptionRecord, RecordKind, TOMBSTONE};
use crate::error::{Error, Result};

/// Timestamp format used in caption records
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source of record timestamps
pub trait Clock {
    /// Current local time formatted with [`TIME_FORMAT`]
    fn now(&self) -> String;
}

/// Wall clock in the local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> String {
        Local::now().format(TIME_FORMAT).to_string()
    }
}

/// Reads and appends caption logs
#[derive(Debug, Clone, Default)]
pub struct CaptionStore<C: Clock = LocalClock> {
    clock: C,
}

impl CaptionStore<LocalClock> {
    pub fn new() -> Self {
        Self::with_clock(LocalClock)
    }
}

impl<C: Clock> CaptionStore<C> {
    /// Create a store stamping records with the given clock
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Load the full record sequence of a caption log
    pub fn load(&self, path: &Path) -> Result<CaptionLog> {
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_slice(&bytes).map_err(|source| Error::MalformedLog {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write an empty log (`[]`) for an image that has none yet
    pub fn create_empty(&self, path: &Path) -> Result<()> {
        write_log(path, &CaptionLog::new())
    }

    /// Append one sentence record and rewrite the log
    ///
    /// Empty text is ignored so that advancing without typing never
    /// commits a blank caption. Returns whether a record was written.
    pub fn append(&self, path: &Path, text: &str) -> Result<bool> {
        if text.is_empty() {
            return Ok(false);
        }

        let mut log = self.load(path)?;
        let record = CaptionRecord {
            id: next_id(&log),
            kind: RecordKind::Sentence,
            timestamp: self.clock.now(),
            text: text.to_string(),
        };
        tracing::debug!(path = %path.display(), id = record.id, "appending caption record");
        log.push(record);

        write_log(path, &log)?;
        Ok(true)
    }

    /// Exclude an image by appending a tombstone
    pub fn mark_excluded(&self, path: &Path) -> Result<()> {
        self.append(path, TOMBSTONE)?;
        Ok(())
    }
}

/// Next record ID: one past the largest ID already in the log
fn next_id(log: &[CaptionRecord]) -> u64 {
    log.iter()
        .map(|r| r.id)
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

/// Serialize the whole log and swap it into place
fn write_log(path: &Path, log: &[CaptionRecord]) -> Result<()> {
    // Same indentation the logs have always been written with
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    log.serialize(&mut ser).map_err(|source| Error::MalformedLog {
        path: path.to_path_buf(),
        source,
    })?;

    // Data must be on disk before the rename makes it visible
    let tmp_path = temp_path(path);
    let written = File::create(&tmp_path)
        .and_then(|mut file| {
            file.write_all(&buf)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp_path, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(Error::io(path, e));
    }

    sync_parent_dir(path);
    Ok(())
}

/// Persist the rename itself
#[cfg(unix)]
fn sync_parent_dir(path: &Path) {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = File::open(parent).and_then(|dir| dir.sync_all()) {
            tracing::debug!("Could not sync directory {}: {}", parent.display(), e);
        }
    }
}

// Directories cannot be opened for syncing here
#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) {}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> String {
            "2024-05-06 07:08:09".to_string()
        }
    }

    fn log_with(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("photo.json");
        fs::write(&path, contents).unwrap();
        path
    }

    fn is_timestamp(s: &str) -> bool {
        chrono::NaiveDateTime::parse_from_str(s, TIME_FORMAT).is_ok() && s.len() == 19
    }

    #[test]
    fn test_append_empty_is_noop() {
        let dir = TempDir::new().unwrap();
        let path = log_with(&dir, r#"[{"text":"a"}]"#);
        let store = CaptionStore::new();

        assert!(!store.append(&path, "").unwrap());

        let log = store.load(&path).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"[{"text":"a"}]"#);
    }

    #[test]
    fn test_append_adds_one_sentence() {
        let dir = TempDir::new().unwrap();
        let path = log_with(&dir, "[]");
        let store = CaptionStore::new();

        assert!(store.append(&path, "a dog on a beach").unwrap());

        let log = store.load(&path).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].text, "a dog on a beach");
        assert_eq!(log[0].kind, RecordKind::Sentence);
        assert!(is_timestamp(&log[0].timestamp), "bad timestamp {}", log[0].timestamp);
    }

    #[test]
    fn test_append_uses_clock_and_increments_ids() {
        let dir = TempDir::new().unwrap();
        let path = log_with(
            &dir,
            r#"[{"ID": 205953349093163008, "type": "SENTENCE", "time": "2023-01-01 00:00:00", "text": "old"}]"#,
        );
        let store = CaptionStore::with_clock(FixedClock);

        store.append(&path, "first").unwrap();
        store.append(&path, "second").unwrap();

        let log = store.load(&path).unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log[0].text, "old");
        assert_eq!(log[1].id, 205953349093163009);
        assert_eq!(log[2].id, 205953349093163010);
        assert_eq!(log[2].timestamp, "2024-05-06 07:08:09");
    }

    #[test]
    fn test_first_record_gets_id_one() {
        let dir = TempDir::new().unwrap();
        let path = log_with(&dir, "[]");
        let store = CaptionStore::with_clock(FixedClock);
        store.append(&path, "x").unwrap();
        assert_eq!(store.load(&path).unwrap()[0].id, 1);
    }

    #[test]
    fn test_mark_excluded_appends_tombstone() {
        let dir = TempDir::new().unwrap();
        let path = log_with(&dir, r#"[{"text":"a"}]"#);
        let store = CaptionStore::new();

        store.mark_excluded(&path).unwrap();

        let log = store.load(&path).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].text, "a");
        assert!(log[1].is_tombstone());
    }

    #[test]
    fn test_written_file_is_indented_and_no_temp_left() {
        let dir = TempDir::new().unwrap();
        let path = log_with(&dir, "[]");
        CaptionStore::with_clock(FixedClock).append(&path, "cat").unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n        \"ID\": 1"), "{written}");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_stale_temp_file_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = log_with(&dir, r#"[{"text":"a"}]"#);
        // Left behind by a write that never reached the rename
        fs::write(temp_path(&path), "").unwrap();
        let store = CaptionStore::with_clock(FixedClock);

        store.append(&path, "b").unwrap();

        let log = store.load(&path).unwrap();
        assert_eq!(log.iter().map(|r| r.text.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_failed_write_keeps_previous_log() {
        let dir = TempDir::new().unwrap();
        let path = log_with(&dir, r#"[{"text":"a"}]"#);
        // A directory where the temp file should go makes the write fail
        fs::create_dir(temp_path(&path)).unwrap();

        assert!(matches!(
            CaptionStore::new().append(&path, "b"),
            Err(Error::Io { .. })
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"[{"text":"a"}]"#);
    }

    #[test]
    fn test_create_empty_writes_empty_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("new.json");
        let store = CaptionStore::new();

        store.create_empty(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
        assert!(store.load(&path).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_log_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = CaptionStore::new();

        for bad in [r#"{"text":"a"}"#, r#"[{"caption":"a"}]"#, "[1, 2]", "", "not json"] {
            let path = log_with(&dir, bad);
            assert!(
                matches!(store.load(&path), Err(Error::MalformedLog { .. })),
                "expected malformed for {bad:?}"
            );
        }
    }

    #[test]
    fn test_append_to_malformed_leaves_file_alone() {
        let dir = TempDir::new().unwrap();
        let path = log_with(&dir, "{broken");
        let store = CaptionStore::new();

        assert!(store.append(&path, "x").is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{broken");
    }

    #[test]
    fn test_missing_log_is_io_error() {
        let dir = TempDir::new().unwrap();
        let store = CaptionStore::new();
        let result = store.load(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
