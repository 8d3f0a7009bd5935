//! Flashcard API smoke-test CLI
//!
//! Runs the register → study → teardown scenario against a live API and
//! writes every response to a JSON file for inspection.

use clap::Parser;
use flashcard_smoke::{cli, commands, common::logging};
use commands::Commands;

#[derive(Parser)]
#[command(name = "flashcard-smoke", about = "Smoke-test harness for the flashcard study API")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    logging::init_cli();

    let cli = Cli::parse();

    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
