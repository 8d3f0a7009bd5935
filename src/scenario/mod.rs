//! Flashcard API smoke scenario
//!
//! Executes the fixed sequence of dependent API calls, threading the token
//! and resource identifiers from earlier responses into later requests and
//! recording every response in a [`RunLedger`].

pub mod catalog;
pub mod executor;
pub mod extract;
pub mod fixtures;
pub mod ledger;
pub mod report;
pub mod runner;
pub mod state;
pub mod step;

pub use catalog::flashcard_steps;
pub use executor::{HttpRequest, HttpTransport, RawResponse, StepExecutor, Transport};
pub use fixtures::Fixtures;
pub use ledger::{RunLedger, StepBody, StepResult};
pub use runner::{run_scenario, AbortReason, RunOutcome, RunReport, SkippedStep};
pub use state::SessionState;
pub use step::{AuthRequirement, BodySlot, Capture, ResourceKind, StepDefinition};
