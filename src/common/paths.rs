//! Configuration paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/flashcard-smoke/`
//! - macOS: `~/Library/Application Support/flashcard-smoke/`
//! - Windows: `%APPDATA%\flashcard-smoke\`

use std::path::PathBuf;

/// Application directory name
const APP_NAME: &str = "flashcard-smoke";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}
