//! Transaction domain model

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single normalized transaction row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// None when the source cell was blank
    pub customer_name: Option<String>,
    pub date: NaiveDate,
    pub total: Decimal,
}

impl TransactionRecord {
    pub fn new(customer_name: Option<String>, date: NaiveDate, total: Decimal) -> Self {
        Self { customer_name, date, total }
    }

    /// Canonical `YYYY-MM` label; sorts chronologically as plain text
    pub fn month_label(&self) -> String {
        month_label(self.date)
    }
}

/// Format the calendar month of a date as `YYYY-MM`
pub fn month_label(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Working set after validation and coercion.
///
/// Every record has a valid date and a numeric total. The counters
/// describe what the normalizer did and are only used for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedTable {
    pub records: Vec<TransactionRecord>,
    /// Rows dropped because the date could not be parsed
    pub dropped_rows: usize,
    /// Rows kept with an amount coerced to zero
    pub coerced_amounts: usize,
}

impl NormalizedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn totals(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.records.iter().map(|r| r.total)
    }
}

/// Truncate an amount toward zero, saturating at the i64 bounds
pub fn truncate_amount(amount: Decimal) -> i64 {
    amount.trunc().to_i64().unwrap_or(if amount.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Add two amounts, clamping to the Decimal range instead of overflowing
pub fn saturating_add(acc: Decimal, amount: Decimal) -> Decimal {
    acc.checked_add(amount).unwrap_or(if amount.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    })
}

/// Truncate a float toward zero; NaN maps to 0
pub fn truncate_float(value: f64) -> i64 {
    // `as` saturates at the bounds and maps NaN to 0
    value.trunc() as i64
}
