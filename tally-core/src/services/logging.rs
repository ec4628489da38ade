//! Logging service - structured event logging through `tracing`
//!
//! Provides a privacy-safe event log. Only event names, counts and error
//! messages are recorded; customer names and amounts never are.
//!
//! This service is designed to be used by both the CLI and the HTTP server.

use serde::{Deserialize, Serialize};

/// Detect the current platform
fn detect_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else {
        "unknown"
    }
}

/// Entry point for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Cli,
    Server,
}

impl EntryPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Cli => "cli",
            EntryPoint::Server => "server",
        }
    }
}

/// A log event to be recorded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropped_rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coerced_amounts: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub months: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomalies: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl LogEvent {
    /// Create a new log event with just an event name
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            ..Default::default()
        }
    }

    /// Set the command context (CLI subcommand or HTTP route)
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Set the raw input row count
    pub fn with_input_rows(mut self, rows: usize) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Set normalization counts
    pub fn with_rows(mut self, rows: usize, dropped: usize, coerced: usize) -> Self {
        self.rows = Some(rows);
        self.dropped_rows = Some(dropped);
        self.coerced_amounts = Some(coerced);
        self
    }

    /// Set report sizes
    pub fn with_report(mut self, months: usize, anomalies: usize) -> Self {
        self.months = Some(months);
        self.anomalies = Some(anomalies);
        self
    }

    /// Set error information
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.error_message.is_some()
    }
}

/// Service for structured event logging
///
/// Events go to whatever `tracing` subscriber the binary installed.
#[derive(Debug, Clone)]
pub struct LoggingService {
    entry_point: EntryPoint,
    app_version: String,
    platform: &'static str,
}

impl LoggingService {
    pub fn new(entry_point: EntryPoint, app_version: impl Into<String>) -> Self {
        Self {
            entry_point,
            app_version: app_version.into(),
            platform: detect_platform(),
        }
    }

    pub fn entry_point(&self) -> EntryPoint {
        self.entry_point
    }

    /// Record an event; errors go out at WARN, everything else at INFO
    pub fn log(&self, event: &LogEvent) {
        let entry_point = self.entry_point.as_str();
        if let Some(error) = &event.error_message {
            tracing::warn!(
                event = %event.event,
                entry_point,
                app_version = %self.app_version,
                platform = self.platform,
                command = event.command.as_deref(),
                rows = event.rows,
                error = %error,
                "analytics event"
            );
        } else {
            tracing::info!(
                event = %event.event,
                entry_point,
                app_version = %self.app_version,
                platform = self.platform,
                command = event.command.as_deref(),
                rows = event.rows,
                dropped_rows = event.dropped_rows,
                coerced_amounts = event.coerced_amounts,
                months = event.months,
                anomalies = event.anomalies,
                "analytics event"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builder() {
        let event = LogEvent::new("analytics_completed")
            .with_command("analyze")
            .with_rows(12, 1, 2)
            .with_report(3, 1);

        assert_eq!(event.event, "analytics_completed");
        assert_eq!(event.command.as_deref(), Some("analyze"));
        assert_eq!(event.rows, Some(12));
        assert_eq!(event.dropped_rows, Some(1));
        assert_eq!(event.coerced_amounts, Some(2));
        assert_eq!(event.months, Some(3));
        assert_eq!(event.anomalies, Some(1));
        assert!(!event.is_error());
    }

    #[test]
    fn test_event_serialization_skips_unset_fields() {
        let event = LogEvent::new("analytics_rejected").with_error("Missing column: date");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "analytics_rejected");
        assert_eq!(json["error_message"], "Missing column: date");
        assert!(json.get("rows").is_none());
        assert!(event.is_error());
    }

    #[test]
    fn test_log_without_subscriber_is_noop() {
        let logger = LoggingService::new(EntryPoint::Server, "0.1.0");
        assert_eq!(logger.entry_point(), EntryPoint::Server);
        logger.log(&LogEvent::new("analytics_started"));
        logger.log(&LogEvent::new("anomaly_model_failed").with_error("boom"));
    }
}
