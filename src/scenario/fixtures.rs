//! Request fixtures
//!
//! The data the scenario sends. Defaults describe a throwaway account with
//! one deck and one card; a YAML file can override any subset of fields.

use serde::Deserialize;
use std::path::Path;

use crate::common::{Error, Result};

/// All request data for one run
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Fixtures {
    pub account: AccountFixture,
    pub deck: DeckFixture,
    pub card: CardFixture,
    pub review: ReviewFixture,
}

/// The account registered, updated and finally deleted
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AccountFixture {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Username sent by the update step
    pub updated_username: String,
}

impl Default for AccountFixture {
    fn default() -> Self {
        Self {
            username: "testuser789".to_string(),
            email: "testuser789@example.com".to_string(),
            password: "12345678a".to_string(),
            updated_username: "updateduser789".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DeckFixture {
    pub title: String,
    pub description: String,
    pub updated_title: String,
    pub updated_description: String,
}

impl Default for DeckFixture {
    fn default() -> Self {
        Self {
            title: "Basic Math".to_string(),
            description: "Simple arithmetic flashcards".to_string(),
            updated_title: "Advanced Math".to_string(),
            updated_description: "Complex arithmetic flashcards".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CardFixture {
    pub front: String,
    pub back: String,
    /// Comma-separated, as the API expects
    pub tags: String,
    pub updated_front: String,
    pub updated_back: String,
}

impl Default for CardFixture {
    fn default() -> Self {
        Self {
            front: "What is 2+2?".to_string(),
            back: "4".to_string(),
            tags: "math,basics".to_string(),
            updated_front: "What is 3+3?".to_string(),
            updated_back: "6".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReviewFixture {
    pub quality: String,
    /// RFC 3339 timestamp
    pub reviewed_at: String,
}

impl Default for ReviewFixture {
    fn default() -> Self {
        Self {
            quality: "Good".to_string(),
            reviewed_at: "2023-10-27T10:00:00Z".to_string(),
        }
    }
}

impl Fixtures {
    /// Load fixtures from a YAML file; unspecified fields keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::FixtureParse(e.to_string()))
    }
}
