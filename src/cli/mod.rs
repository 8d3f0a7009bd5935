//! CLI command handling
//!
//! Loads configuration, runs the scenario and persists the ledger.

use std::path::Path;

use colored::Colorize;
use tracing::info;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::scenario::{
    flashcard_steps, report, run_scenario, AuthRequirement, Fixtures, HttpTransport, RunOutcome,
    Transport,
};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            config,
            base_url,
            output,
            fixtures,
        } => {
            let mut config = match config {
                Some(path) => Config::load_from(&path)?,
                None => Config::load()?,
            };
            if let Some(base_url) = base_url {
                config.base_url = base_url;
            }
            if let Some(output) = output {
                config.output = output;
            }
            if fixtures.is_some() {
                config.fixtures = fixtures;
            }
            run(&config).await
        }

        Commands::Steps { fixtures, verbose } => {
            let fixtures = load_fixtures(fixtures.as_deref())?;
            list_steps(&fixtures, verbose)
        }
    }
}

async fn run(config: &Config) -> Result<()> {
    let transport = HttpTransport::new(config.user_agent.as_str())?;
    run_with(&transport, config).await
}

async fn run_with<T: Transport + ?Sized>(transport: &T, config: &Config) -> Result<()> {
    let base_url = config.base_url()?;
    let fixtures = load_fixtures(config.fixtures.as_deref())?;
    let steps = flashcard_steps(&fixtures);

    println!(
        "\n{} {}",
        "Running smoke scenario against".blue().bold(),
        base_url.white().bold()
    );
    info!(%base_url, steps = steps.len(), "Starting run");

    // A transport failure returns here before anything is written.
    let report = match run_scenario(transport, &base_url, &steps).await {
        Ok(report) => report,
        Err(e) => {
            if e.is_transport() {
                report::unreachable(&base_url);
            }
            return Err(e);
        }
    };

    report.ledger.save(&config.output)?;
    info!(path = %config.output.display(), entries = report.ledger.len(), "Ledger saved");
    report::summary(&report, Some(&config.output));

    match report.outcome {
        RunOutcome::Completed => Ok(()),
        RunOutcome::Aborted { step, reason } => Err(Error::RunAborted {
            step,
            reason: reason.to_string(),
        }),
    }
}

fn load_fixtures(path: Option<&Path>) -> Result<Fixtures> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading fixtures");
            Fixtures::load(path)
        }
        None => Ok(Fixtures::default()),
    }
}

fn list_steps(fixtures: &Fixtures, verbose: bool) -> Result<()> {
    let steps = flashcard_steps(fixtures);
    crate::scenario::catalog::validate(&steps)?;

    for (i, step) in steps.iter().enumerate() {
        let auth = match step.auth {
            AuthRequirement::None => "",
            AuthRequirement::Bearer => "bearer",
        };
        let requires: Vec<_> = step.requires.iter().map(|kind| kind.placeholder()).collect();
        println!(
            "{:>3}. {} {:<7} {:<24} {} {}",
            i + 1,
            format!("{:<20}", step.name).white().bold(),
            step.method.as_str(),
            step.path,
            format!("{:<7}", auth).dimmed(),
            requires.join(", ").dimmed()
        );
        if verbose {
            if let Some(body) = &step.body {
                println!("       {}", serde_json::to_string(body)?.dimmed());
            }
        }
    }

    Ok(())
}
