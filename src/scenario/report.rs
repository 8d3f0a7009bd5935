//! Operator-facing console trace

use std::path::Path;

use colored::Colorize;

use super::extract::token_prefix;
use super::ledger::StepResult;
use super::runner::{RunOutcome, RunReport};
use super::step::ResourceKind;

const RULE_WIDTH: usize = 60;

/// Banner printed before a step runs
pub fn section(number: usize, title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    println!("\n{}", rule.dimmed());
    println!(" {}", format!("{}. Testing {}", number, title).cyan().bold());
    println!("{}\n", rule.dimmed());
}

/// Status code and pretty-printed body of a recorded step
pub fn step_result(result: &StepResult) {
    let status = result.status_code.to_string();
    let status = if (200..300).contains(&result.status_code) {
        status.green()
    } else if result.status_code >= 500 {
        status.red()
    } else {
        status.yellow()
    };
    println!("Status: {}", status);
    println!("Response: {}\n", result.body.pretty());
}

pub fn token_extracted(token: &str) {
    println!("Token extracted: {}...", token_prefix(token).dimmed());
}

pub fn identifier_extracted(kind: ResourceKind, id: &str) {
    println!("{} ID extracted: {}", capitalize(&kind.to_string()), id.dimmed());
}

pub fn skipped(number: usize, name: &str, missing: &[ResourceKind]) {
    let missing: Vec<_> = missing.iter().map(|kind| kind.placeholder()).collect();
    println!(
        "\n{} {}. {} (missing {})",
        "-".dimmed(),
        number,
        name.dimmed(),
        missing.join(", ")
    );
}

/// Final summary line
pub fn summary(report: &RunReport, saved_to: Option<&Path>) {
    match &report.outcome {
        RunOutcome::Completed => println!(
            "\n{} {} ({} recorded, {} skipped)",
            "✓".green().bold(),
            "Run completed".green().bold(),
            report.ledger.len(),
            report.skipped.len()
        ),
        RunOutcome::Aborted { step, reason } => println!(
            "\n{} {} at '{}': {} ({} recorded)",
            "✗".red().bold(),
            "Run aborted".red().bold(),
            step,
            reason,
            report.ledger.len()
        ),
    }
    if let Some(path) = saved_to {
        println!("  All responses saved to {}", path.display().to_string().white());
    }
}

/// Summary line when the API stopped answering mid-run
pub fn unreachable(base_url: &str) {
    println!(
        "\n{} {} at {}; no responses were saved",
        "✗".red().bold(),
        "API unreachable".red().bold(),
        base_url.white()
    );
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
