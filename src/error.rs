/// Error types for the caption curation engine
///
/// Every engine operation returns `Result<T>`; nothing is retried.
/// The shell shows the message in its status line and lets the user decide.
use std::path::PathBuf;
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Root folder is missing or unreadable at scan time
    #[error("Cannot scan {}: {reason}", path.display())]
    Path { path: PathBuf, reason: String },

    /// A caption log is not an array of caption records
    #[error("Malformed caption log {}: {source}", path.display())]
    MalformedLog {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Every entry in the folder is excluded
    #[error("All {count} images are excluded (DELETE_ME); nothing left to caption")]
    NoEligibleEntries { count: usize },

    /// The folder contains no supported images
    #[error("No supported images (png, jpg, jpeg, bmp, gif) found in folder")]
    EmptyWorkingSet,

    /// File read/write failure
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration loading error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
