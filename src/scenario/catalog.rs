//! The fixed flashcard API scenario
//!
//! Built once from the fixtures before a run and never changed afterwards.

use std::collections::{BTreeSet, HashSet};

use reqwest::Method;
use serde_json::json;

use super::fixtures::Fixtures;
use super::step::{AuthRequirement, Capture, ResourceKind, StepDefinition};
use crate::common::{Error, Result};

/// Status the login step answers with on success
pub const LOGIN_OK: u16 = 200;
/// Status resource-creation steps answer with on success
pub const CREATED: u16 = 201;

/// The seventeen scenario steps in execution order
pub fn flashcard_steps(fixtures: &Fixtures) -> Vec<StepDefinition> {
    use ResourceKind::{Card, Deck};

    let account = &fixtures.account;
    let deck = &fixtures.deck;
    let card = &fixtures.card;
    let review = &fixtures.review;

    vec![
        StepDefinition::new("register", "Register", Method::POST, "/auth/register").body(json!({
            "username": account.username,
            "email": account.email,
            "password": account.password,
            "confirmPassword": account.password,
        })),
        StepDefinition::new("login", "Login", Method::POST, "/auth/login")
            .body(json!({
                "email": account.email,
                "password": account.password,
            }))
            .capture(Capture::Token {
                field: "accessToken",
                on_status: LOGIN_OK,
            }),
        StepDefinition::new("getCurrentUser", "Get Current User", Method::GET, "/user").bearer(),
        StepDefinition::new("updateCurrentUser", "Update Current User", Method::PATCH, "/user")
            .bearer()
            .body(json!({ "username": account.updated_username })),
        StepDefinition::new("createDeck", "Create Deck", Method::POST, "/deck")
            .bearer()
            .body(json!({
                "title": deck.title,
                "description": deck.description,
            }))
            .capture(Capture::Resource {
                kind: Deck,
                field: "id",
                on_status: CREATED,
            }),
        StepDefinition::new(
            "getAllDecks",
            "Get All Decks For Current User",
            Method::GET,
            "/deck",
        )
        .bearer(),
        StepDefinition::new("getDeckById", "Get Deck By ID", Method::GET, "/deck/{deckId}")
            .bearer()
            .requires(&[Deck]),
        StepDefinition::new("updateDeck", "Update Deck", Method::PATCH, "/deck/{deckId}")
            .bearer()
            .requires(&[Deck])
            .body(json!({
                "title": deck.updated_title,
                "description": deck.updated_description,
            })),
        StepDefinition::new("createCard", "Create Card", Method::POST, "/card")
            .bearer()
            .requires(&[Deck])
            .body(json!({
                "deckId": null,
                "front": card.front,
                "back": card.back,
                "tags": card.tags,
            }))
            .slot("/deckId", Deck)
            .capture(Capture::Resource {
                kind: Card,
                field: "id",
                on_status: CREATED,
            }),
        StepDefinition::new(
            "getCardsByDeck",
            "Get Cards By Deck",
            Method::GET,
            "/card?deckId={deckId}",
        )
        .bearer()
        .requires(&[Deck]),
        StepDefinition::new("getCardById", "Get Card By ID", Method::GET, "/card/{cardId}")
            .bearer()
            .requires(&[Card]),
        StepDefinition::new("updateCard", "Update Card", Method::PATCH, "/card/{cardId}")
            .bearer()
            .requires(&[Card])
            .body(json!({
                "front": card.updated_front,
                "back": card.updated_back,
            })),
        StepDefinition::new(
            "startStudySession",
            "Start Study Session",
            Method::GET,
            "/study/start/{deckId}",
        )
        .bearer()
        .requires(&[Deck]),
        StepDefinition::new("submitCardReview", "Submit Card Review", Method::POST, "/study/review")
            .bearer()
            .requires(&[Card])
            .body(json!({
                "CardReviews": [{ "cardId": null, "quality": review.quality }],
                "reviewedAt": review.reviewed_at,
            }))
            .slot("/CardReviews/0/cardId", Card),
        StepDefinition::new("deleteCard", "Delete Card", Method::DELETE, "/card/{cardId}")
            .bearer()
            .requires(&[Card]),
        StepDefinition::new("deleteDeck", "Delete Deck", Method::DELETE, "/deck/{deckId}")
            .bearer()
            .requires(&[Deck]),
        StepDefinition::new("deleteCurrentUser", "Delete Current User", Method::DELETE, "/user").bearer(),
    ]
}

/// Check that a catalog can run forward without dangling references
///
/// Rules:
/// - step names are unique
/// - every path placeholder and body slot a step uses is in its `requires`
/// - every required kind is captured by an earlier step
/// - bearer steps come after a token-capturing step
pub fn validate(steps: &[StepDefinition]) -> Result<()> {
    let mut names = HashSet::new();
    let mut produced: BTreeSet<ResourceKind> = BTreeSet::new();
    let mut token_available = false;

    for step in steps {
        if !names.insert(step.name) {
            return Err(Error::InvalidCatalog(format!(
                "step name '{}' appears more than once",
                step.name
            )));
        }

        let requires: BTreeSet<ResourceKind> = step.requires.iter().copied().collect();
        if let Some(kind) = step.referenced_kinds()?.difference(&requires).next() {
            return Err(Error::InvalidCatalog(format!(
                "step '{}' references {{{}}} without requiring it",
                step.name,
                kind.placeholder()
            )));
        }
        if let Some(kind) = requires.difference(&produced).next() {
            return Err(Error::InvalidCatalog(format!(
                "step '{}' requires a {} identifier no earlier step captures",
                step.name, kind
            )));
        }
        if step.auth == AuthRequirement::Bearer && !token_available {
            return Err(Error::InvalidCatalog(format!(
                "step '{}' needs a bearer token before any step captures one",
                step.name
            )));
        }

        match &step.capture {
            Some(Capture::Token { .. }) => token_available = true,
            Some(Capture::Resource { kind, .. }) => {
                produced.insert(*kind);
            }
            None => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_is_valid() {
        validate(&flashcard_steps(&Fixtures::default())).unwrap();
    }

    #[test]
    fn test_catalog_order() {
        let names: Vec<_> = flashcard_steps(&Fixtures::default())
            .iter()
            .map(|step| step.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "register",
                "login",
                "getCurrentUser",
                "updateCurrentUser",
                "createDeck",
                "getAllDecks",
                "getDeckById",
                "updateDeck",
                "createCard",
                "getCardsByDeck",
                "getCardById",
                "updateCard",
                "startStudySession",
                "submitCardReview",
                "deleteCard",
                "deleteDeck",
                "deleteCurrentUser",
            ]
        );
    }

    #[test]
    fn test_only_register_and_login_are_unauthenticated() {
        let open: Vec<_> = flashcard_steps(&Fixtures::default())
            .into_iter()
            .filter(|step| step.auth == AuthRequirement::None)
            .map(|step| step.name)
            .collect();
        assert_eq!(open, vec!["register", "login"]);
    }

    #[test]
    fn test_fixtures_flow_into_bodies() {
        let mut fixtures = Fixtures::default();
        fixtures.account.password = "hunter22".into();
        let steps = flashcard_steps(&fixtures);

        let register = steps[0].body.as_ref().unwrap();
        assert_eq!(register["password"], "hunter22");
        assert_eq!(register["confirmPassword"], "hunter22");
    }

    #[test]
    fn test_fixture_text_with_braces_is_not_an_identifier() {
        let mut fixtures = Fixtures::default();
        fixtures.card.updated_back = "{deckId}".into();
        fixtures.card.front = "What is {cardId}?".into();
        let steps = flashcard_steps(&fixtures);

        validate(&steps).unwrap();
        let update = steps.iter().find(|step| step.name == "updateCard").unwrap();
        assert_eq!(update.body.as_ref().unwrap()["back"], "{deckId}");
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let steps = vec![
            StepDefinition::new("register", "Register", Method::POST, "/auth/register"),
            StepDefinition::new("register", "Register", Method::POST, "/auth/register"),
        ];
        assert!(matches!(validate(&steps), Err(Error::InvalidCatalog(_))));
    }

    #[test]
    fn test_rejects_unrequired_placeholder() {
        let steps = vec![StepDefinition::new("getDeckById", "Get Deck", Method::GET, "/deck/{deckId}")];
        assert!(matches!(validate(&steps), Err(Error::InvalidCatalog(_))));
    }

    #[test]
    fn test_rejects_requirement_never_captured() {
        let steps = vec![
            StepDefinition::new("getDeckById", "Get Deck", Method::GET, "/deck/{deckId}")
                .requires(&[ResourceKind::Deck]),
        ];
        assert!(matches!(validate(&steps), Err(Error::InvalidCatalog(_))));
    }

    #[test]
    fn test_rejects_bearer_before_login() {
        let steps = vec![StepDefinition::new("getCurrentUser", "Me", Method::GET, "/user").bearer()];
        assert!(matches!(validate(&steps), Err(Error::InvalidCatalog(_))));
    }
}
