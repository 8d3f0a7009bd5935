//! Run driver
//!
//! Walks the catalog strictly forward: gate, execute, record, extract.
//! A step whose required identifiers are missing is skipped without a
//! request or a ledger entry. A missing login token ends the run with an
//! `Aborted` report; a transport failure ends it with an `Err`.

use std::fmt;

use tracing::{error, warn};

use super::catalog;
use super::executor::{StepExecutor, Transport};
use super::extract::{apply_capture, CaptureOutcome};
use super::ledger::{RunLedger, StepResult};
use super::report;
use super::state::SessionState;
use super::step::{AuthRequirement, Capture, ResourceKind, StepDefinition};
use crate::common::{Error, Result};

/// Why a run stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The login response carried no bearer token
    MissingToken,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::MissingToken => f.write_str("could not extract token"),
        }
    }
}

/// Terminal state of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Aborted { step: String, reason: AbortReason },
}

/// A step the gate kept from running
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedStep {
    pub name: String,
    pub missing: Vec<ResourceKind>,
}

/// Everything a run produced
#[derive(Debug)]
pub struct RunReport {
    pub ledger: RunLedger,
    pub outcome: RunOutcome,
    pub skipped: Vec<SkippedStep>,
}

impl RunReport {
    pub fn is_completed(&self) -> bool {
        self.outcome == RunOutcome::Completed
    }
}

/// Run a catalog of steps against `base_url`
pub async fn run_scenario<T: Transport + ?Sized>(
    transport: &T,
    base_url: &str,
    steps: &[StepDefinition],
) -> Result<RunReport> {
    catalog::validate(steps)?;

    let executor = StepExecutor::new(transport, base_url);
    let mut state = SessionState::new();
    let mut ledger = RunLedger::new();
    let mut skipped = Vec::new();

    for (i, step) in steps.iter().enumerate() {
        let step_num = i + 1;

        let missing = step.missing_requirements(&state);
        if !missing.is_empty() {
            warn!(step = step.name, ?missing, "Skipping step");
            report::skipped(step_num, step.name, &missing);
            skipped.push(SkippedStep {
                name: step.name.to_string(),
                missing,
            });
            continue;
        }

        report::section(step_num, step.title);
        let result = execute_step(&executor, step, &state).await.map_err(|e| {
            error!(step = step.name, error = %e, "Run aborted");
            e
        })?;
        report::step_result(&result);

        let outcome = step
            .capture
            .as_ref()
            .map(|capture| (capture, apply_capture(capture, &result, &mut state)));
        ledger.record(step.name, result);

        match outcome {
            Some((Capture::Token { .. }, CaptureOutcome::Captured(token))) => {
                report::token_extracted(&token);
            }
            Some((Capture::Resource { kind, .. }, CaptureOutcome::Captured(id))) => {
                report::identifier_extracted(*kind, &id);
            }
            Some((_, CaptureOutcome::TokenMissing)) => {
                error!(step = step.name, "Could not extract token; stopping run");
                return Ok(RunReport {
                    ledger,
                    outcome: RunOutcome::Aborted {
                        step: step.name.to_string(),
                        reason: AbortReason::MissingToken,
                    },
                    skipped,
                });
            }
            Some((_, CaptureOutcome::NotProduced)) | None => {}
        }
    }

    Ok(RunReport {
        ledger,
        outcome: RunOutcome::Completed,
        skipped,
    })
}

async fn execute_step<T: Transport + ?Sized>(
    executor: &StepExecutor<'_, T>,
    step: &StepDefinition,
    state: &SessionState,
) -> Result<StepResult> {
    let path = step.render_path(state)?;
    let body = step.render_body(state)?;
    let bearer = match step.auth {
        AuthRequirement::None => None,
        AuthRequirement::Bearer => Some(state.auth_token().ok_or_else(|| {
            Error::InvalidCatalog(format!("step '{}' runs without a bearer token", step.name))
        })?),
    };
    executor.execute(step.method.clone(), &path, bearer, body).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::executor::{HttpRequest, RawResponse};
    use async_trait::async_trait;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Mutex;

    /// Answers every request with the same JSON body
    struct FixedTransport {
        status: u16,
        body: &'static str,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl Transport for FixedTransport {
        async fn send(&self, _request: &HttpRequest) -> Result<RawResponse> {
            *self.calls.lock().unwrap() += 1;
            Ok(RawResponse {
                status: self.status,
                content_type: Some("application/json".into()),
                text: self.body.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_invalid_catalog_makes_no_requests() {
        let transport = FixedTransport {
            status: 200,
            body: "{}",
            calls: Mutex::new(0),
        };
        let steps = vec![StepDefinition::new("getCurrentUser", "Me", Method::GET, "/user").bearer()];

        let err = run_scenario(&transport, "http://api.test", &steps).await.unwrap_err();

        assert!(matches!(err, Error::InvalidCatalog(_)));
        assert_eq!(*transport.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unauthenticated_catalog_completes() {
        let transport = FixedTransport {
            status: 404,
            body: r#"{"message":"nope"}"#,
            calls: Mutex::new(0),
        };
        let steps = vec![StepDefinition::new("register", "Register", Method::POST, "/auth/register")
            .body(json!({"username": "u"}))];

        let report = run_scenario(&transport, "http://api.test", &steps).await.unwrap();

        assert!(report.is_completed());
        assert_eq!(report.ledger.get("register").unwrap().status_code, 404);
    }
}
