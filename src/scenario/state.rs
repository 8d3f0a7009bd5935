//! Session state threaded through one run
//!
//! Owned by the run driver and passed by reference to every step; it is
//! discarded when the run ends. Only the ledger is persisted.

use std::collections::HashMap;

use serde_json::Value;

use super::step::ResourceKind;

/// Credentials and identifiers extracted from earlier responses
#[derive(Debug, Default, Clone)]
pub struct SessionState {
    auth_token: Option<String>,
    /// Kept as the server sent them: a JSON string or number
    resource_ids: HashMap<ResourceKind, Value>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn set_auth_token(&mut self, token: impl Into<String>) {
        self.auth_token = Some(token.into());
    }

    /// Identifier extracted for a resource kind, if any
    pub fn resource(&self, kind: ResourceKind) -> Option<&Value> {
        self.resource_ids.get(&kind)
    }

    /// Identifier rendered for use inside a URL path
    pub fn resource_text(&self, kind: ResourceKind) -> Option<String> {
        self.resource(kind).map(id_text)
    }

    pub fn set_resource(&mut self, kind: ResourceKind, id: impl Into<Value>) {
        self.resource_ids.insert(kind, id.into());
    }
}

/// Text form of an identifier; strings lose their JSON quotes
pub fn id_text(id: &Value) -> String {
    match id {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
