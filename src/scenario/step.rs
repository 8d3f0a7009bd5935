//! Step definitions and placeholder templates
//!
//! A step names one HTTP call in the scenario. Paths may reference
//! extracted identifiers as `{deckId}` / `{cardId}`. Bodies are literal
//! JSON; identifiers go into them only through [`BodySlot`]s, so body text
//! is never parsed for placeholders.

use std::collections::BTreeSet;
use std::fmt;

use reqwest::Method;
use serde_json::Value;

use super::state::SessionState;
use crate::common::{Error, Result};

/// Kind of server-side resource whose identifier later steps depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Deck,
    Card,
}

impl ResourceKind {
    /// Name used inside `{...}` placeholders
    pub fn placeholder(self) -> &'static str {
        match self {
            ResourceKind::Deck => "deckId",
            ResourceKind::Card => "cardId",
        }
    }

    /// Resolve a placeholder name back to its resource kind
    pub fn from_placeholder(name: &str) -> Option<Self> {
        match name {
            "deckId" => Some(ResourceKind::Deck),
            "cardId" => Some(ResourceKind::Card),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Deck => f.write_str("deck"),
            ResourceKind::Card => f.write_str("card"),
        }
    }
}

/// Authentication a step needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthRequirement {
    #[default]
    None,
    /// `Authorization: Bearer <token>` from the login step
    Bearer,
}

/// Value a step's response is expected to carry forward
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    /// Bearer token; its absence aborts the run
    Token { field: &'static str, on_status: u16 },
    /// Resource identifier; only produced on the given status
    Resource {
        kind: ResourceKind,
        field: &'static str,
        on_status: u16,
    },
}

/// Location in a body that receives an extracted identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodySlot {
    /// JSON pointer into the body template, e.g. `/CardReviews/0/cardId`
    pub pointer: &'static str,
    pub kind: ResourceKind,
}

/// One named HTTP operation in the scenario
#[derive(Debug, Clone)]
pub struct StepDefinition {
    /// Ledger key, unique within a catalog
    pub name: &'static str,
    /// Banner text for the operator trace
    pub title: &'static str,
    pub method: Method,
    /// API-relative path template
    pub path: &'static str,
    pub auth: AuthRequirement,
    /// JSON body, sent as-is apart from its slots
    pub body: Option<Value>,
    pub slots: Vec<BodySlot>,
    /// Identifiers that must be held before the step may run
    pub requires: Vec<ResourceKind>,
    pub capture: Option<Capture>,
}

impl StepDefinition {
    /// Create an unauthenticated step with no body
    pub fn new(name: &'static str, title: &'static str, method: Method, path: &'static str) -> Self {
        Self {
            name,
            title,
            method,
            path,
            auth: AuthRequirement::None,
            body: None,
            slots: Vec::new(),
            requires: Vec::new(),
            capture: None,
        }
    }

    pub fn bearer(mut self) -> Self {
        self.auth = AuthRequirement::Bearer;
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Fill the body location at `pointer` with the identifier of `kind`
    pub fn slot(mut self, pointer: &'static str, kind: ResourceKind) -> Self {
        self.slots.push(BodySlot { pointer, kind });
        self
    }

    pub fn requires(mut self, kinds: &[ResourceKind]) -> Self {
        self.requires = kinds.to_vec();
        self
    }

    pub fn capture(mut self, capture: Capture) -> Self {
        self.capture = Some(capture);
        self
    }

    /// Every resource kind referenced by the path or a body slot
    ///
    /// Fails when a path placeholder is unknown or a slot points outside
    /// the body.
    pub fn referenced_kinds(&self) -> Result<BTreeSet<ResourceKind>> {
        let mut kinds = BTreeSet::new();
        for name in scan_placeholders(self.path)? {
            let kind = ResourceKind::from_placeholder(name).ok_or_else(|| {
                Error::template(self.path, &format!("unknown placeholder '{{{}}}'", name))
            })?;
            kinds.insert(kind);
        }
        for slot in &self.slots {
            if self.body.as_ref().and_then(|body| body.pointer(slot.pointer)).is_none() {
                return Err(Error::template(slot.pointer, "slot does not exist in the body"));
            }
            kinds.insert(slot.kind);
        }
        Ok(kinds)
    }

    /// Required identifiers the session does not hold yet
    pub fn missing_requirements(&self, state: &SessionState) -> Vec<ResourceKind> {
        self.requires
            .iter()
            .copied()
            .filter(|kind| state.resource(*kind).is_none())
            .collect()
    }

    /// Resolve the path template against the session
    pub fn render_path(&self, state: &SessionState) -> Result<String> {
        render_template(self.path, state)
    }

    /// Fill the body's slots from the session
    ///
    /// Identifiers keep their JSON type, so a numeric id stays a number.
    pub fn render_body(&self, state: &SessionState) -> Result<Option<Value>> {
        let Some(mut body) = self.body.clone() else {
            return Ok(None);
        };
        for slot in &self.slots {
            let id = state.resource(slot.kind).ok_or_else(|| {
                Error::template(
                    slot.pointer,
                    &format!("identifier '{}' was never extracted", slot.kind.placeholder()),
                )
            })?;
            let target = body
                .pointer_mut(slot.pointer)
                .ok_or_else(|| Error::template(slot.pointer, "slot does not exist in the body"))?;
            *target = id.clone();
        }
        Ok(Some(body))
    }
}

/// Names between `{` and `}` in a template, in order of appearance
fn scan_placeholders(template: &str) -> Result<Vec<&str>> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let end = after
            .find('}')
            .ok_or_else(|| Error::template(template, "unterminated placeholder"))?;
        names.push(&after[..end]);
        rest = &after[end + 1..];
    }
    Ok(names)
}

fn render_template(template: &str, state: &SessionState) -> Result<String> {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        rendered.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find('}')
            .ok_or_else(|| Error::template(template, "unterminated placeholder"))?;
        rendered.push_str(&lookup(template, &after[..end], state)?);
        rest = &after[end + 1..];
    }
    rendered.push_str(rest);
    Ok(rendered)
}

fn lookup(template: &str, name: &str, state: &SessionState) -> Result<String> {
    let kind = ResourceKind::from_placeholder(name)
        .ok_or_else(|| Error::template(template, &format!("unknown placeholder '{{{}}}'", name)))?;
    state.resource_text(kind).ok_or_else(|| {
        Error::template(template, &format!("identifier '{}' was never extracted", name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state_with_deck(id: &str) -> SessionState {
        let mut state = SessionState::new();
        state.set_resource(ResourceKind::Deck, id);
        state
    }

    #[test]
    fn test_render_path_substitutes_identifier() {
        let step = StepDefinition::new("getDeckById", "Get Deck By ID", Method::GET, "/deck/{deckId}");
        assert_eq!(step.render_path(&state_with_deck("D1")).unwrap(), "/deck/D1");
    }

    #[test]
    fn test_render_path_in_query_string() {
        let step = StepDefinition::new("getCardsByDeck", "Get Cards By Deck", Method::GET, "/card?deckId={deckId}");
        assert_eq!(step.render_path(&state_with_deck("42")).unwrap(), "/card?deckId=42");
    }

    #[test]
    fn test_render_path_without_identifier_fails() {
        let step = StepDefinition::new("getCardById", "Get Card By ID", Method::GET, "/card/{cardId}");
        let err = step.render_path(&state_with_deck("D1")).unwrap_err();
        assert!(matches!(err, Error::Template { .. }));
    }

    #[test]
    fn test_unknown_and_unterminated_placeholders() {
        let unknown = StepDefinition::new("x", "X", Method::GET, "/thing/{thingId}");
        assert!(unknown.referenced_kinds().is_err());

        let open = StepDefinition::new("y", "Y", Method::GET, "/deck/{deckId");
        assert!(open.referenced_kinds().is_err());
    }

    #[test]
    fn test_render_body_fills_slots_with_typed_ids() {
        let mut state = state_with_deck("D1");
        state.set_resource(ResourceKind::Card, 42);
        let step = StepDefinition::new("submitCardReview", "Submit Card Review", Method::POST, "/study/review")
            .body(json!({
                "CardReviews": [{ "cardId": null, "quality": "Good" }],
                "note": "literal {braces} stay",
            }))
            .slot("/CardReviews/0/cardId", ResourceKind::Card);

        let body = step.render_body(&state).unwrap().unwrap();
        assert_eq!(body["CardReviews"][0]["cardId"], json!(42));
        assert_eq!(body["note"], "literal {braces} stay");
    }

    #[test]
    fn test_body_text_matching_a_placeholder_is_left_alone() {
        let step = StepDefinition::new("updateCard", "Update Card", Method::PATCH, "/card/{cardId}")
            .body(json!({ "front": "{deckId}", "back": "{cardId}" }));

        let kinds: Vec<_> = step.referenced_kinds().unwrap().into_iter().collect();
        assert_eq!(kinds, vec![ResourceKind::Card]);

        let mut state = state_with_deck("D1");
        state.set_resource(ResourceKind::Card, "C1");
        let body = step.render_body(&state).unwrap().unwrap();
        assert_eq!(body, json!({ "front": "{deckId}", "back": "{cardId}" }));
    }

    #[test]
    fn test_referenced_kinds_covers_path_and_slots() {
        let step = StepDefinition::new("createCard", "Create Card", Method::POST, "/card")
            .body(json!({ "deckId": null, "front": "Q" }))
            .slot("/deckId", ResourceKind::Deck);
        let kinds: Vec<_> = step.referenced_kinds().unwrap().into_iter().collect();
        assert_eq!(kinds, vec![ResourceKind::Deck]);
    }

    #[test]
    fn test_slot_outside_body_is_rejected() {
        let step = StepDefinition::new("createCard", "Create Card", Method::POST, "/card")
            .body(json!({ "front": "Q" }))
            .slot("/deckId", ResourceKind::Deck);
        assert!(matches!(step.referenced_kinds(), Err(Error::Template { .. })));
        assert!(step.render_body(&state_with_deck("D1")).is_err());
    }

    #[test]
    fn test_render_body_without_identifier_fails() {
        let step = StepDefinition::new("createCard", "Create Card", Method::POST, "/card")
            .body(json!({ "deckId": null }))
            .slot("/deckId", ResourceKind::Deck);
        assert!(matches!(step.render_body(&SessionState::new()), Err(Error::Template { .. })));
    }

    #[test]
    fn test_missing_requirements_reports_absent_kinds() {
        let step = StepDefinition::new("getCardById", "Get Card By ID", Method::GET, "/card/{cardId}")
            .requires(&[ResourceKind::Deck, ResourceKind::Card]);
        assert_eq!(step.missing_requirements(&state_with_deck("D1")), vec![ResourceKind::Card]);
        assert_eq!(
            step.missing_requirements(&SessionState::new()),
            vec![ResourceKind::Deck, ResourceKind::Card]
        );
    }
}
