//! Run ledger: per-step outcomes in execution order
//!
//! Every executed step is recorded the same way regardless of its status
//! code. A step name missing from the ledger means the step was skipped.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{Error, Result};

/// Response body as decided by the executor
///
/// On disk both variants are plain JSON; a text body is a JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepBody {
    /// Non-JSON response kept verbatim
    Text(String),
    /// Parsed JSON response
    Json(Value),
}

impl StepBody {
    /// The JSON value, when the response was parsed as JSON
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            StepBody::Json(value) => Some(value),
            StepBody::Text(_) => None,
        }
    }

    /// Human-readable rendering for the operator trace
    pub fn pretty(&self) -> String {
        match self {
            StepBody::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            StepBody::Text(text) => text.clone(),
        }
    }
}

/// Outcome of one executed step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub status_code: u16,
    pub body: StepBody,
}

impl StepResult {
    pub fn new(status_code: u16, body: StepBody) -> Self {
        Self { status_code, body }
    }

    pub fn json(status_code: u16, body: Value) -> Self {
        Self::new(status_code, StepBody::Json(body))
    }

    pub fn text(status_code: u16, body: impl Into<String>) -> Self {
        Self::new(status_code, StepBody::Text(body.into()))
    }
}

/// Step name → result, in the order steps first ran
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunLedger {
    entries: IndexMap<String, StepResult>,
}

impl RunLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a step's result, returning the entry it replaced
    ///
    /// Re-recording a name keeps its original position.
    pub fn record(&mut self, name: impl Into<String>, result: StepResult) -> Option<StepResult> {
        self.entries.insert(name.into(), result)
    }

    pub fn get(&self, name: &str) -> Option<&StepResult> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recorded step names in execution order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StepResult)> {
        self.entries.iter().map(|(name, result)| (name.as_str(), result))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the ledger as a single JSON document
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Read back a ledger written by [`RunLedger::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
        Ok(serde_json::from_str(&content)?)
    }
}
