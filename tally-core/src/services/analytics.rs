//! Analytics service - runs the full report pipeline over one table

use crate::adapters::csv_table::read_table_bytes;
use crate::config::AnalyticsSettings;
use crate::domain::result::{Error, Result};
use crate::domain::{AnalyticsOutcome, AnalyticsReport, Table};

use super::aggregate::{monthly_revenue, top_customers, trend_series};
use super::anomaly::{detect_anomalies, AnomalyScan};
use super::forecast::{forecast_next, LinearTrend};
use super::logging::{LogEvent, LoggingService};
use super::normalize::normalize;

/// Analytics service for customer revenue reports
///
/// Holds only immutable settings, so one instance can serve concurrent
/// requests; every call builds its own working set and models.
#[derive(Debug, Clone)]
pub struct AnalyticsService {
    settings: AnalyticsSettings,
    logger: LoggingService,
}

impl AnalyticsService {
    /// Create a service, rejecting settings the pipeline cannot run with
    pub fn new(settings: AnalyticsSettings, logger: LoggingService) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings, logger })
    }

    pub fn settings(&self) -> &AnalyticsSettings {
        &self.settings
    }

    /// Run the pipeline, folding fatal errors into the error payload
    pub fn run(&self, table: &Table, command: &str) -> AnalyticsOutcome {
        match self.report(table, command) {
            Ok(report) => AnalyticsOutcome::Report(report),
            Err(e) => self.reject(e, command),
        }
    }

    /// Decode CSV bytes and run the pipeline over them
    pub fn run_csv(&self, bytes: &[u8], command: &str) -> AnalyticsOutcome {
        match read_table_bytes(bytes) {
            Ok(table) => self.run(&table, command),
            Err(e) => self.reject(e, command),
        }
    }

    /// Log a request-ending error and turn it into the error payload
    pub fn reject(&self, error: Error, command: &str) -> AnalyticsOutcome {
        self.logger.log(
            &LogEvent::new("analytics_rejected")
                .with_command(command)
                .with_error(error.to_string()),
        );
        AnalyticsOutcome::from(error)
    }

    /// Run the pipeline; the only error is a missing required column
    pub fn report(&self, table: &Table, command: &str) -> Result<AnalyticsReport> {
        self.analyze(table, command).map(|details| details.report)
    }

    /// Run the pipeline and keep the intermediate figures alongside the report
    pub fn analyze(&self, table: &Table, command: &str) -> Result<ReportDetails> {
        self.logger.log(
            &LogEvent::new("analytics_started")
                .with_command(command)
                .with_input_rows(table.row_count()),
        );

        let normalized = normalize(table)?;

        let top = top_customers(&normalized, self.settings.top_customers);
        let buckets = monthly_revenue(&normalized);
        let forecast = forecast_next(&buckets);

        let anomalies = match detect_anomalies(&normalized, &self.settings) {
            AnomalyScan::Failed(e) => {
                self.logger.log(
                    &LogEvent::new("anomaly_model_failed")
                        .with_command(command)
                        .with_error(e.to_string()),
                );
                Vec::new()
            }
            scan => scan.into_flags(),
        };

        let (months, revenue_trend) = trend_series(&buckets);

        self.logger.log(
            &LogEvent::new("analytics_completed")
                .with_command(command)
                .with_rows(normalized.len(), normalized.dropped_rows, normalized.coerced_amounts)
                .with_report(months.len(), anomalies.len()),
        );

        Ok(ReportDetails {
            report: AnalyticsReport {
                top_customers: top,
                months,
                revenue_trend,
                prediction: forecast.prediction,
                anomalies: anomalies.iter().map(|a| a.message()).collect(),
            },
            trend: forecast.trend,
            rows: normalized.len(),
            dropped_rows: normalized.dropped_rows,
            coerced_amounts: normalized.coerced_amounts,
        })
    }
}

/// A report plus the figures behind it, for diagnostic views
#[derive(Debug, Clone)]
pub struct ReportDetails {
    pub report: AnalyticsReport,
    /// Fitted line when there were at least two months
    pub trend: Option<LinearTrend>,
    /// Rows in the normalized working set
    pub rows: usize,
    pub dropped_rows: usize,
    pub coerced_amounts: usize,
}
