/// Shared data structures for the curation state
///
/// These structs represent the data model that flows between
/// the caption logs on disk and the UI layer.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Reserved caption text marking an image as excluded
pub const TOMBSTONE: &str = "DELETE_ME";

/// Kind of a caption record. Only sentences exist today.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordKind {
    #[default]
    Sentence,
}

/// One logged annotation event
///
/// Field names match the on-disk format:
/// `{"ID": 1, "type": "SENTENCE", "time": "2024-01-31 12:00:00", "text": "..."}`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CaptionRecord {
    /// Record identifier, unique within its log
    #[serde(rename = "ID", default)]
    pub id: u64,
    /// Record kind
    #[serde(rename = "type", default)]
    pub kind: RecordKind,
    /// Creation time, `YYYY-MM-DD HH:MM:SS`
    #[serde(rename = "time", default)]
    pub timestamp: String,
    /// Caption text, or `DELETE_ME` for a tombstone
    pub text: String,
}

impl CaptionRecord {
    /// Whether this record excludes its image rather than captioning it
    pub fn is_tombstone(&self) -> bool {
        self.text == TOMBSTONE
    }
}

/// The full caption history of one image, in append order
pub type CaptionLog = Vec<CaptionRecord>;

/// An image paired with its caption log
///
/// Holds paths only. Anything derived from the log (weight, captions)
/// is read from disk when it is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Full path to the image file
    pub image_path: PathBuf,
    /// Full path to the sibling `.json` caption log
    pub log_path: PathBuf,
}

impl Entry {
    /// Pair an image with its caption log (same stem, `.json` extension)
    pub fn for_image(image_path: &Path) -> Self {
        Self {
            image_path: image_path.to_path_buf(),
            log_path: image_path.with_extension("json"),
        }
    }
}

/// Everything the presentation layer needs to draw the current entry
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentView {
    pub image_path: PathBuf,
    pub log_path: PathBuf,
    pub records: CaptionLog,
    /// Cursor position in the working set
    pub index: usize,
    /// Working set size
    pub total: usize,
}

impl CurrentView {
    /// Captions to show as read-only text (tombstones hidden)
    pub fn captions(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .filter(|r| !r.is_tombstone())
            .map(|r| r.text.as_str())
    }
}
