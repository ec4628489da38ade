//! Core domain entities
//!
//! All analytics entities are defined here. These are pure data structures
//! with no I/O or external dependencies.

mod report;
pub mod result;
mod table;
mod transaction;

pub use report::{AnalyticsOutcome, AnalyticsReport, AnomalyFlag, CustomerRevenue, MonthlyBucket};
pub use table::Table;
pub use transaction::{
    month_label, saturating_add, truncate_amount, truncate_float, NormalizedTable, TransactionRecord,
};
