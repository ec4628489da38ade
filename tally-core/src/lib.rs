//! Tally Core - customer revenue analytics
//!
//! This crate turns a transaction table into a revenue report:
//!
//! - **domain**: Core entities (Table, TransactionRecord, AnalyticsReport, etc.)
//! - **services**: Pipeline stages (normalize, aggregate, forecast, anomaly) and their orchestration
//! - **adapters**: CSV decoding and the HTTP upload endpoint
//! - **config**: settings.json loading with env overrides

pub mod adapters;
pub mod config;
pub mod domain;
pub mod services;

use std::path::Path;

use anyhow::{Context, Result};

use config::Config;
use services::{AnalyticsService, EntryPoint, LoggingService};

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{AnalyticsOutcome, AnalyticsReport, CustomerRevenue, Table};
pub use services::{LogEvent, ReportDetails};

/// Main context for Tally operations
///
/// Holds the loaded configuration and the services built from it.
pub struct TallyContext {
    pub config: Config,
    pub logger: LoggingService,
    pub analytics_service: AnalyticsService,
}

impl TallyContext {
    /// Create a new Tally context
    pub fn new(tally_dir: &Path, entry_point: EntryPoint) -> Result<Self> {
        let config = Config::load(tally_dir)?;
        Self::from_config(config, entry_point)
    }

    /// Build services from an already loaded configuration
    pub fn from_config(config: Config, entry_point: EntryPoint) -> Result<Self> {
        let logger = LoggingService::new(entry_point, env!("CARGO_PKG_VERSION"));
        let analytics_service = AnalyticsService::new(config.analytics.clone(), logger.clone())
            .context("Invalid analytics settings")?;

        Ok(Self {
            config,
            logger,
            analytics_service,
        })
    }
}
