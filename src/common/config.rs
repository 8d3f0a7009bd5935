//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::paths::config_path;
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize)]
pub struct Config {
    /// API root every step path is appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Where the run ledger is written
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Optional YAML file overriding the request fixtures
    #[serde(default)]
    pub fixtures: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            output: default_output(),
            user_agent: default_user_agent(),
            fixtures: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("api-responses.json")
}

fn default_user_agent() -> String {
    "flashcard-smoke".to_string()
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit path, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// The configured base URL, validated and without a trailing slash
    pub fn base_url(&self) -> Result<String> {
        validate_base_url(&self.base_url)
    }
}

/// Validate that a base URL can address the API.
///
/// Rules:
/// - must parse as an absolute URL with a host
/// - scheme must be `http` or `https`
fn validate_base_url(base: &str) -> Result<String> {
    let parsed = reqwest::Url::parse(base)
        .map_err(|e| Error::Config(format!("Invalid base URL '{}': {}", base, e)))?;

    if parsed.host_str().is_none() {
        return Err(Error::Config(format!("Base URL '{}' must include a host", base)));
    }

    match parsed.scheme() {
        "http" | "https" => Ok(base.trim_end_matches('/').to_string()),
        other => Err(Error::Config(format!(
            "Base URL must use http or https; got '{}://'",
            other
        ))),
    }
}
