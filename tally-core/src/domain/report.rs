//! Report model returned to the analytics consumer

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::Error;
use super::transaction::truncate_amount;

/// One entry of the top customers list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRevenue {
    pub customer: String,
    pub revenue: i64,
}

/// Revenue summed over one calendar month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyBucket {
    /// `YYYY-MM`
    pub month: String,
    /// Exact sum; truncated only when rendered into the report
    pub revenue: Decimal,
}

impl MonthlyBucket {
    pub fn truncated_revenue(&self) -> i64 {
        truncate_amount(self.revenue)
    }
}

/// A transaction whose amount was classified as an outlier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnomalyFlag {
    pub date: NaiveDate,
    pub amount: i64,
}

impl AnomalyFlag {
    /// Human-readable description used in the report
    pub fn message(&self) -> String {
        format!(
            "Date {} — Suspicious total: {}",
            self.date.format("%Y-%m-%d"),
            self.amount
        )
    }
}

/// Successful analytics result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub top_customers: Vec<CustomerRevenue>,
    pub months: Vec<String>,
    pub revenue_trend: Vec<i64>,
    pub prediction: i64,
    pub anomalies: Vec<String>,
}

/// Either a report or the error payload, never both
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalyticsOutcome {
    Report(AnalyticsReport),
    Failed { error: String },
}

impl AnalyticsOutcome {
    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed { error: error.into() }
    }

    pub fn is_report(&self) -> bool {
        matches!(self, Self::Report(_))
    }

    pub fn report(&self) -> Option<&AnalyticsReport> {
        match self {
            Self::Report(report) => Some(report),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Report(_) => None,
            Self::Failed { error } => Some(error),
        }
    }
}

impl From<AnalyticsReport> for AnalyticsOutcome {
    fn from(report: AnalyticsReport) -> Self {
        Self::Report(report)
    }
}

impl From<Error> for AnalyticsOutcome {
    fn from(err: Error) -> Self {
        Self::failed(err.to_string())
    }
}
