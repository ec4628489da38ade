//! Config command - show effective settings

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use super::{get_tally_dir, load_config};
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let tally_dir = get_tally_dir()?;
    let config = load_config()?;

    if json {
        let value = json!({
            "directory": tally_dir,
            "analytics": config.analytics,
            "server": config.server,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "Tally Configuration".bold());
    println!("{}", tally_dir.join("settings.json").display().to_string().dimmed());
    println!();

    let analytics = &config.analytics;
    let mut table = output::create_table();
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec!["analytics.topCustomers".to_string(), analytics.top_customers.to_string()]);
    table.add_row(vec!["analytics.anomalyMinRows".to_string(), analytics.anomaly_min_rows.to_string()]);
    table.add_row(vec!["analytics.contamination".to_string(), analytics.contamination.to_string()]);
    table.add_row(vec!["analytics.seed".to_string(), analytics.seed.to_string()]);
    table.add_row(vec!["analytics.trees".to_string(), analytics.trees.to_string()]);
    table.add_row(vec!["analytics.maxSamples".to_string(), analytics.max_samples.to_string()]);
    table.add_row(vec!["server.bind".to_string(), config.server.bind.clone()]);
    println!("{}", table);

    if let Err(e) = analytics.validate() {
        println!();
        output::warning(&e.to_string());
    }

    Ok(())
}
