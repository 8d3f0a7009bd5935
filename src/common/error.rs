//! Error types for the smoke-test harness
//!
//! Only run-fatal conditions are errors. Every HTTP status a step receives,
//! 4xx and 5xx included, is a recorded outcome and never surfaces here.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the smoke-test harness
#[derive(Error, Debug)]
pub enum Error {
    // === Transport Errors ===
    #[error("Transport failure: {0}")]
    Transport(String),

    // === Scenario Errors ===
    #[error("Run aborted at step '{step}': {reason}")]
    RunAborted { step: String, reason: String },

    #[error("Step catalog is invalid: {0}")]
    InvalidCatalog(String),

    #[error("Cannot render template '{template}': {reason}")]
    Template { template: String, reason: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid fixtures file: {0}")]
    FixtureParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a template rendering error
    pub fn template(template: &str, reason: &str) -> Self {
        Self::Template {
            template: template.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a file read error for a path
    pub fn file_read(path: &std::path::Path, error: &io::Error) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Whether this error came from the network layer
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
