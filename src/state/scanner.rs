/// Image discovery
///
/// Walks a folder recursively, pairs every supported image with its
/// `.json` caption log, and creates an empty log where one is missing.
use std::path::Path;
use walkdir::WalkDir;

use super::data::Entry;
use super::store::{CaptionStore, Clock};
use crate::error::{Error, Result};

/// Supported image extensions (matched case-insensitively)
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "gif"];

/// Result of a folder scan
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Discovered entries, in traversal order
    pub entries: Vec<Entry>,
    /// How many empty caption logs were created
    pub created_logs: usize,
}

/// Check if a path looks like a supported image by extension
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension() {
        Some(extension) => {
            let ext = extension.to_string_lossy().to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Scan `root` for images and make sure each has a caption log
pub fn scan<C: Clock>(root: &Path, store: &CaptionStore<C>) -> Result<ScanResult> {
    // Fail up front rather than returning a partial list
    let metadata = std::fs::metadata(root).map_err(|e| Error::Path {
        path: root.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !metadata.is_dir() {
        return Err(Error::Path {
            path: root.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    tracing::info!("🔍 Scanning folder: {}", root.display());

    let mut entries = Vec::new();
    for item in WalkDir::new(root) {
        let item = match item {
            Ok(item) => item,
            // Only the root itself is fatal; anything deeper is skipped
            Err(e) if e.depth() == 0 => {
                return Err(Error::Path {
                    path: root.to_path_buf(),
                    reason: e.to_string(),
                })
            }
            Err(e) => {
                tracing::warn!("⚠️  Skipping unreadable path: {}", e);
                continue;
            }
        };

        // is_file() resolves symlinks, so linked images count and dangling links do not
        let path = item.path();
        if !path.is_file() || !is_supported_image(path) {
            continue;
        }
        entries.push(Entry::for_image(path));
    }

    let mut created_logs = 0;
    for entry in &entries {
        if !entry.log_path.exists() {
            tracing::warn!(
                "Caption log not found for image {}, creating empty log",
                entry.image_path.display()
            );
            store.create_empty(&entry.log_path)?;
            created_logs += 1;
        }
    }

    tracing::info!(
        "✅ Scan complete: {} images, {} new caption logs",
        entries.len(),
        created_logs
    );

    Ok(ScanResult {
        entries,
        created_logs,
    })
}
