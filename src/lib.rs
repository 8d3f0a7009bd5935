//! Flashcard API smoke-test harness
//!
//! This library drives a fixed, dependent sequence of REST calls against the
//! flashcard study API and records every response in an ordered ledger.

pub mod cli;
pub mod commands;
pub mod common;
pub mod scenario;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use scenario::{run_scenario, RunLedger, RunOutcome, RunReport, StepResult, Transport};
