//! Configuration management
//!
//! Settings live in `settings.json` inside the tally directory:
//! ```json
//! {
//!   "analytics": { "topCustomers": 5, "anomalyMinRows": 10, "contamination": 0.05, ... },
//!   "server": { "bind": "127.0.0.1:8000" }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    analytics: AnalyticsSettings,
    #[serde(default)]
    server: ServerSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Tunables for the analytics pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsSettings {
    /// How many customers survive into the report
    pub top_customers: usize,
    /// Minimum normalized rows before anomaly detection runs
    pub anomaly_min_rows: usize,
    /// Expected share of outliers, in (0, 0.5]
    pub contamination: f64,
    pub seed: u64,
    pub trees: usize,
    /// Upper bound on each tree's sub-sample
    pub max_samples: usize,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            top_customers: 5,
            anomaly_min_rows: 10,
            contamination: 0.05,
            seed: 42,
            trees: 100,
            max_samples: 256,
        }
    }
}

impl AnalyticsSettings {
    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(Error::config(format!(
                "contamination must be in (0, 0.5], got {}",
                self.contamination
            )));
        }
        if self.trees == 0 {
            return Err(Error::config("trees must be at least 1"));
        }
        if self.max_samples == 0 {
            return Err(Error::config("maxSamples must be at least 1"));
        }
        if self.top_customers == 0 {
            return Err(Error::config("topCustomers must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: DEFAULT_BIND.to_string() }
    }
}

/// Tally configuration (effective view of settings plus env overrides)
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub analytics: AnalyticsSettings,
    pub server: ServerSettings,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Config {
    /// Load config from the tally directory
    ///
    /// Environment overrides:
    /// 1. TALLY_BIND - server listen address
    /// 2. TALLY_SEED - isolation forest seed
    pub fn load(tally_dir: &Path) -> Result<Self> {
        Self::load_with(tally_dir, |key| std::env::var(key).ok())
    }

    fn load_with(tally_dir: &Path, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let settings_path = tally_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %settings_path.display(), error = %e, "Ignoring unreadable settings file");
                SettingsFile::default()
            })
        } else {
            SettingsFile::default()
        };

        let mut config = Self {
            analytics: raw.analytics.clone(),
            server: raw.server.clone(),
            _raw_settings: raw,
        };
        config.apply_env_overrides(lookup);
        Ok(config)
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = lookup("TALLY_BIND").filter(|b| !b.trim().is_empty()) {
            self.server.bind = bind.trim().to_string();
        }
        match lookup("TALLY_SEED").map(|s| s.trim().parse::<u64>()) {
            Some(Ok(seed)) => self.analytics.seed = seed,
            Some(Err(e)) => tracing::warn!(error = %e, "Ignoring invalid TALLY_SEED"),
            None => {}
        }
    }

    /// Save config to the tally directory
    /// Preserves other settings that tally doesn't manage
    pub fn save(&self, tally_dir: &Path) -> Result<()> {
        let settings_path = tally_dir.join("settings.json");

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            self._raw_settings.clone()
        };

        settings.analytics = self.analytics.clone();
        settings.server = self.server.clone();

        let content = serde_json::to_string_pretty(&settings)
            .map_err(|e| Error::config(format!("Failed to serialize settings: {}", e)))?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }
}
