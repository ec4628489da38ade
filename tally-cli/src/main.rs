//! Tally CLI - customer revenue analytics in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{analyze, config, serve};

/// Tally - customer revenue analytics from a transaction CSV
#[derive(Parser)]
#[command(name = "tally", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a transaction CSV (customer_name, date, total)
    Analyze {
        /// Path to CSV file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Number of top customers to report
        #[arg(long)]
        top: Option<usize>,
    },

    /// Serve the upload endpoint over HTTP
    Serve {
        /// Listen address (overrides settings and TALLY_BIND)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Show effective configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    commands::init_tracing();

    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze { file, json, top } => analyze::run(&file, json, top),
        Commands::Serve { bind } => serve::run(bind),
        Commands::Config { json } => config::run(json),
    }
}
