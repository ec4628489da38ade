//! Analyze command - run the revenue report over a local CSV file

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use comfy_table::{Cell, CellAlignment};

use tally_core::adapters::csv_table::read_table_bytes;
use tally_core::services::EntryPoint;
use tally_core::{AnalyticsOutcome, ReportDetails};

use super::{get_context, load_config};
use crate::output;

const COMMAND: &str = "analyze";

pub fn run(file: &Path, json: bool, top: Option<usize>) -> Result<()> {
    let mut config = load_config()?;
    if let Some(top) = top {
        config.analytics.top_customers = top;
    }
    let ctx = get_context(config, EntryPoint::Cli)?;
    let service = &ctx.analytics_service;

    let bytes = std::fs::read(file)
        .with_context(|| format!("Failed to read {:?}", file))?;
    tracing::debug!(file = %file.display(), bytes = bytes.len(), "Read input file");

    let details = read_table_bytes(&bytes).and_then(|table| service.analyze(&table, COMMAND));
    let details = match details {
        Ok(details) => details,
        Err(e) => {
            let outcome = service.reject(e, COMMAND);
            let message = outcome.error().unwrap_or_default().to_string();
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            }
            anyhow::bail!(message);
        }
    };

    if json {
        let outcome = AnalyticsOutcome::from(details.report);
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    print_report(file, &details);
    Ok(())
}

fn print_report(file: &Path, details: &ReportDetails) {
    let report = &details.report;

    println!("{}", "Customer Revenue Report".bold());
    println!("{}", file.display().to_string().dimmed());
    println!();

    let mut summary = output::create_table();
    summary.add_row(vec!["Rows analyzed".to_string(), details.rows.to_string()]);
    summary.add_row(vec!["Rows dropped (bad date)".to_string(), details.dropped_rows.to_string()]);
    summary.add_row(vec!["Amounts zeroed (bad total)".to_string(), details.coerced_amounts.to_string()]);
    println!("{}", summary);
    println!();

    println!("{}", "Top Customers".bold());
    if report.top_customers.is_empty() {
        output::warning("  No customers found");
    } else {
        let mut table = output::create_table();
        table.set_header(vec!["#", "Customer", "Revenue"]);
        for (rank, customer) in report.top_customers.iter().enumerate() {
            table.add_row(vec![
                Cell::new(rank + 1),
                Cell::new(&customer.customer),
                Cell::new(output::format_revenue(customer.revenue)).set_alignment(CellAlignment::Right),
            ]);
        }
        println!("{}", table);
    }
    println!();

    println!("{}", "Monthly Revenue".bold());
    if report.months.is_empty() {
        output::warning("  No dated transactions");
    } else {
        let mut table = output::create_table();
        table.set_header(vec!["Month", "Revenue"]);
        for (month, revenue) in report.months.iter().zip(&report.revenue_trend) {
            table.add_row(vec![
                Cell::new(month),
                Cell::new(output::format_revenue(*revenue)).set_alignment(CellAlignment::Right),
            ]);
        }
        println!("{}", table);
    }
    println!();

    println!("{}", "Forecast".bold());
    println!("  Next month: {}", output::format_revenue(report.prediction).bold());
    match details.trend {
        Some(trend) => println!(
            "  Linear trend: {:+.2} per month (intercept {:.2})",
            trend.slope, trend.intercept
        ),
        None => output::info("  Not enough months for a trend; using last known value"),
    }
    println!();

    println!("{}", "Anomalies".bold());
    if report.anomalies.is_empty() {
        output::success("  No suspicious transactions");
    } else {
        for anomaly in &report.anomalies {
            output::warning(&format!("  • {}", anomaly));
        }
    }
}
