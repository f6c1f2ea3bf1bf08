/// Application configuration
///
/// Root folder resolution priority:
/// 1. Command-line argument or `CAPTION_CURATOR_ROOT` (handled by clap)
/// 2. `root_folder` in the TOML config file
/// 3. Native folder picker, shown by the UI when neither is set
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Side length of the square the preview image is fitted into
pub const DEFAULT_PREVIEW_SIZE: u32 = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Folder to curate, `None` means ask the user
    pub root_folder: Option<PathBuf>,
    pub preview_size: u32,
}

/// On-disk config file layout
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    root_folder: Option<PathBuf>,
    preview_size: Option<u32>,
}

/// Get the path where the config file is looked up
/// - Linux: ~/.config/caption-curator/config.toml
/// - macOS: ~/Library/Application Support/caption-curator/config.toml
/// - Windows: %APPDATA%\caption-curator\config.toml
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("caption-curator").join("config.toml"))
}

/// Load the config file (if any) and merge command-line overrides on top
pub fn load(cli_root: Option<PathBuf>, cli_preview_size: Option<u32>) -> Result<Config> {
    let file_contents = match config_file_path() {
        Some(path) if path.exists() => {
            tracing::info!("Loading config from {}", path.display());
            Some(std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?)
        }
        _ => None,
    };

    resolve(cli_root, cli_preview_size, file_contents.as_deref())
}

fn resolve(
    cli_root: Option<PathBuf>,
    cli_preview_size: Option<u32>,
    file_contents: Option<&str>,
) -> Result<Config> {
    let file: FileConfig = match file_contents {
        Some(contents) => toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))?,
        None => FileConfig::default(),
    };

    let preview_size = cli_preview_size
        .or(file.preview_size)
        .unwrap_or(DEFAULT_PREVIEW_SIZE);
    if preview_size == 0 {
        return Err(Error::Config("preview_size must be greater than zero".to_string()));
    }

    Ok(Config {
        root_folder: cli_root.or(file.root_folder),
        preview_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = resolve(None, None, None).unwrap();
        assert_eq!(config.root_folder, None);
        assert_eq!(config.preview_size, DEFAULT_PREVIEW_SIZE);
    }

    #[test]
    fn test_file_values_used() {
        let config = resolve(
            None,
            None,
            Some("root_folder = \"/photos/dataset\"\npreview_size = 800\n"),
        )
        .unwrap();
        assert_eq!(config.root_folder, Some(PathBuf::from("/photos/dataset")));
        assert_eq!(config.preview_size, 800);
    }

    #[test]
    fn test_cli_overrides_file() {
        let config = resolve(
            Some(PathBuf::from("/cli")),
            Some(300),
            Some("root_folder = \"/file\"\npreview_size = 800\n"),
        )
        .unwrap();
        assert_eq!(config.root_folder, Some(PathBuf::from("/cli")));
        assert_eq!(config.preview_size, 300);
    }

    #[test]
    fn test_bad_file_is_config_error() {
        assert!(matches!(
            resolve(None, None, Some("root_folder = [")),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            resolve(None, None, Some("unknown_key = 1")),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_zero_preview_size_rejected() {
        assert!(matches!(resolve(None, Some(0), None), Err(Error::Config(_))));
    }
}
