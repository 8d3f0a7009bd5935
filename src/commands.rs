//! CLI command definitions
//!
//! Defines the clap commands for the smoke-test CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the smoke scenario against the API and save every response
    Run {
        /// Configuration file (default: platform config dir)
        #[arg(long)]
        config: Option<PathBuf>,

        /// API root, e.g. http://localhost:3000/api
        #[arg(long)]
        base_url: Option<String>,

        /// Where to write the collected responses
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// YAML file overriding the request fixtures
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },

    /// List the scenario steps without sending any request
    Steps {
        /// YAML file overriding the request fixtures
        #[arg(long)]
        fixtures: Option<PathBuf>,

        /// Also print each step's request body
        #[arg(long, short)]
        verbose: bool,
    },
}
