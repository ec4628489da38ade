//! CLI command implementations

pub mod analyze;
pub mod config;
pub mod serve;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tally_core::config::Config;
use tally_core::services::EntryPoint;
use tally_core::TallyContext;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the tracing subscriber; RUST_LOG overrides the default filter
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tally_core=info,tally_cli=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Get the tally directory from environment or default
pub fn get_tally_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TALLY_DIR") {
        Ok(PathBuf::from(dir))
    } else {
        dirs::home_dir()
            .map(|home| home.join(".tally"))
            .context("Could not find home directory")
    }
}

/// Load the effective configuration
pub fn load_config() -> Result<Config> {
    let tally_dir = get_tally_dir()?;
    Config::load(&tally_dir)
        .with_context(|| format!("Failed to load settings from {:?}", tally_dir))
}

/// Build a context from an already adjusted configuration
pub fn get_context(config: Config, entry_point: EntryPoint) -> Result<TallyContext> {
    TallyContext::from_config(config, entry_point).context("Failed to initialize tally context")
}
