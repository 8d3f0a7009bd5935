//! State extraction from recorded responses
//!
//! The API may or may not wrap its payload in a `data` envelope, so a field
//! is looked up through an ordered list of strategies and the first hit wins.

use serde_json::Value;
use tracing::{info, warn};

use super::ledger::StepResult;
use super::state::{id_text, SessionState};
use super::step::Capture;

/// Where in a response body to look for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Inside the object held by the named wrapper field
    Envelope(&'static str),
    /// At the top level of the body
    TopLevel,
}

/// Envelope first, then top level
pub const DEFAULT_STRATEGIES: &[ExtractionStrategy] =
    &[ExtractionStrategy::Envelope("data"), ExtractionStrategy::TopLevel];

impl ExtractionStrategy {
    pub fn lookup(&self, body: &Value, field: &str) -> Option<Value> {
        let container = match self {
            ExtractionStrategy::Envelope(wrapper) => body.get(*wrapper)?,
            ExtractionStrategy::TopLevel => body,
        };
        scalar(container.get(field)?)
    }
}

/// Non-empty strings and numbers count as present; anything else does not
fn scalar(value: &Value) -> Option<Value> {
    match value {
        Value::String(text) if !text.is_empty() => Some(value.clone()),
        Value::Number(_) => Some(value.clone()),
        _ => None,
    }
}

/// Look a field up with each strategy in turn
///
/// The value keeps its JSON type.
pub fn extract_field(body: &Value, field: &str, strategies: &[ExtractionStrategy]) -> Option<Value> {
    strategies
        .iter()
        .find_map(|strategy| strategy.lookup(body, field))
}

/// What applying a capture did to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Value stored in the session, in text form
    Captured(String),
    /// Resource step did not produce an identifier; dependents will skip
    NotProduced,
    /// Login did not yield a token; the run cannot continue
    TokenMissing,
}

/// Apply a step's capture rule to its recorded result
///
/// Extraction is attempted only when the status matches the capture's
/// expected status. Text bodies never yield a value.
pub fn apply_capture(capture: &Capture, result: &StepResult, state: &mut SessionState) -> CaptureOutcome {
    let (field, on_status) = match capture {
        Capture::Token { field, on_status } => (*field, *on_status),
        Capture::Resource { field, on_status, .. } => (*field, *on_status),
    };

    let value = if result.status_code == on_status {
        result
            .body
            .as_json()
            .and_then(|body| extract_field(body, field, DEFAULT_STRATEGIES))
    } else {
        None
    };

    match (capture, value) {
        (Capture::Token { .. }, Some(value)) => {
            let token = id_text(&value);
            info!(token_prefix = %token_prefix(&token), "Token extracted");
            state.set_auth_token(token.clone());
            CaptureOutcome::Captured(token)
        }
        (Capture::Token { .. }, None) => CaptureOutcome::TokenMissing,
        (Capture::Resource { kind, .. }, Some(id)) => {
            let text = id_text(&id);
            info!(%kind, id = %text, "Identifier extracted");
            state.set_resource(*kind, id);
            CaptureOutcome::Captured(text)
        }
        (Capture::Resource { kind, .. }, None) => {
            warn!(%kind, status = result.status_code, "No identifier produced");
            CaptureOutcome::NotProduced
        }
    }
}

/// First 20 characters of a token, for logs
pub fn token_prefix(token: &str) -> String {
    token.chars().take(20).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::step::ResourceKind;
    use serde_json::json;

    fn deck_capture() -> Capture {
        Capture::Resource {
            kind: ResourceKind::Deck,
            field: "id",
            on_status: 201,
        }
    }

    fn token_capture() -> Capture {
        Capture::Token {
            field: "accessToken",
            on_status: 200,
        }
    }

    #[test]
    fn test_envelope_and_top_level_both_yield_value() {
        let wrapped = json!({"data": {"id": "X"}});
        let flat = json!({"id": "X"});
        assert_eq!(extract_field(&wrapped, "id", DEFAULT_STRATEGIES), Some(json!("X")));
        assert_eq!(extract_field(&flat, "id", DEFAULT_STRATEGIES), Some(json!("X")));
    }

    #[test]
    fn test_envelope_wins_over_top_level() {
        let body = json!({"id": "outer", "data": {"id": "inner"}});
        assert_eq!(extract_field(&body, "id", DEFAULT_STRATEGIES), Some(json!("inner")));
    }

    #[test]
    fn test_empty_envelope_value_falls_through() {
        let body = json!({"data": {"id": ""}, "id": "fallback"});
        assert_eq!(extract_field(&body, "id", DEFAULT_STRATEGIES), Some(json!("fallback")));

        let null_data = json!({"data": null, "id": 7});
        assert_eq!(extract_field(&null_data, "id", DEFAULT_STRATEGIES), Some(json!(7)));
    }

    #[test]
    fn test_non_scalar_values_are_absent() {
        assert_eq!(extract_field(&json!({"id": {"nested": 1}}), "id", DEFAULT_STRATEGIES), None);
        assert_eq!(extract_field(&json!({"id": true}), "id", DEFAULT_STRATEGIES), None);
        assert_eq!(extract_field(&json!([1, 2]), "id", DEFAULT_STRATEGIES), None);
    }

    #[test]
    fn test_token_capture_sets_session_token() {
        let mut state = SessionState::new();
        let result = StepResult::json(200, json!({"data": {"accessToken": "abc"}}));

        let outcome = apply_capture(&token_capture(), &result, &mut state);

        assert_eq!(outcome, CaptureOutcome::Captured("abc".into()));
        assert_eq!(state.auth_token(), Some("abc"));
    }

    #[test]
    fn test_token_missing_from_body_or_wrong_status() {
        let mut state = SessionState::new();
        let empty = StepResult::json(200, json!({}));
        assert_eq!(apply_capture(&token_capture(), &empty, &mut state), CaptureOutcome::TokenMissing);

        let unauthorized = StepResult::json(401, json!({"accessToken": "abc"}));
        assert_eq!(
            apply_capture(&token_capture(), &unauthorized, &mut state),
            CaptureOutcome::TokenMissing
        );
        assert!(state.auth_token().is_none());
    }

    #[test]
    fn test_resource_only_captured_on_creation_status() {
        let mut state = SessionState::new();
        let failed = StepResult::json(500, json!({"data": {"id": "D1"}}));
        assert_eq!(apply_capture(&deck_capture(), &failed, &mut state), CaptureOutcome::NotProduced);
        assert!(state.resource(ResourceKind::Deck).is_none());

        let created = StepResult::json(201, json!({"data": {"id": "D1"}}));
        assert_eq!(
            apply_capture(&deck_capture(), &created, &mut state),
            CaptureOutcome::Captured("D1".into())
        );
        assert_eq!(state.resource(ResourceKind::Deck), Some(&json!("D1")));
    }

    #[test]
    fn test_numeric_identifier_is_stored_as_number() {
        let mut state = SessionState::new();
        let created = StepResult::json(201, json!({"data": {"id": 7}}));

        assert_eq!(
            apply_capture(&deck_capture(), &created, &mut state),
            CaptureOutcome::Captured("7".into())
        );
        assert_eq!(state.resource(ResourceKind::Deck), Some(&json!(7)));
    }

    #[test]
    fn test_text_body_never_yields_identifier() {
        let mut state = SessionState::new();
        let result = StepResult::text(201, "created");
        assert_eq!(apply_capture(&deck_capture(), &result, &mut state), CaptureOutcome::NotProduced);
    }

    #[test]
    fn test_token_prefix_truncates() {
        assert_eq!(token_prefix("short"), "short");
        assert_eq!(token_prefix(&"a".repeat(64)).len(), 20);
    }
}
