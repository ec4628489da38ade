//! Validation and type coercion of the raw input table

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::{NormalizedTable, Table, TransactionRecord};

pub const CUSTOMER_COLUMN: &str = "customer_name";
pub const DATE_COLUMN: &str = "date";
pub const TOTAL_COLUMN: &str = "total";

/// Checked in this order; the first absent one is reported
pub const REQUIRED_COLUMNS: [&str; 3] = [CUSTOMER_COLUMN, DATE_COLUMN, TOTAL_COLUMN];

/// Verify the required columns and build the working set.
///
/// Rows with an unparseable date are dropped. Rows with an unparseable
/// amount are kept with a zero total. The input table is not touched.
pub fn normalize(table: &Table) -> Result<NormalizedTable> {
    let mut indices = [0usize; 3];
    for (slot, name) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = table
            .column_index(name)
            .ok_or_else(|| Error::missing_column(name))?;
    }
    let [customer_idx, date_idx, total_idx] = indices;

    let mut normalized = NormalizedTable::default();

    for row in 0..table.row_count() {
        let Some(date) = parse_date(table.cell(row, date_idx)) else {
            normalized.dropped_rows += 1;
            continue;
        };

        let total = match parse_amount(table.cell(row, total_idx)) {
            Some(amount) => amount,
            None => {
                normalized.coerced_amounts += 1;
                Decimal::ZERO
            }
        };

        // Names group verbatim; only blank cells lose their customer
        let customer = table.cell(row, customer_idx);
        let customer_name = (!customer.trim().is_empty()).then(|| customer.to_string());

        normalized
            .records
            .push(TransactionRecord::new(customer_name, date, total));
    }

    Ok(normalized)
}

/// Parse a calendar date, keeping only the date part of datetimes
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // Month-first wins for ambiguous slash dates
    let date_formats = [
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%m/%d/%Y",
        "%d/%m/%Y",
        "%m-%d-%Y",
        "%d-%m-%Y",
        "%Y%m%d",
        "%b %d, %Y",
        "%B %d, %Y",
        "%d %b %Y",
        "%d %B %Y",
    ];
    for fmt in &date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];
    for fmt in &datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    parse_month(s)
}

/// `YYYY-MM` or `YYYY/MM`, taken as the first of that month
fn parse_month(s: &str) -> Option<NaiveDate> {
    let (year, rest) = (s.get(..4)?, s.get(4..)?);
    if !year.bytes().all(|b| b.is_ascii_digit()) || rest.len() > 3 {
        return None;
    }

    [("%Y-%m-%d", '-'), ("%Y/%m/%d", '/')]
        .into_iter()
        .filter(|(_, sep)| rest.starts_with(*sep))
        .find_map(|(fmt, sep)| NaiveDate::parse_from_str(&format!("{}{}01", s, sep), fmt).ok())
}

/// Parse a signed amount; plain decimals and scientific notation only
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    if s.is_empty() {
        return None;
    }

    Decimal::from_str(s)
        .ok()
        .or_else(|| {
            if s.contains(['e', 'E']) {
                Decimal::from_scientific(s).ok()
            } else {
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: Vec<Vec<&str>>) -> Table {
        Table::from_rows(["customer_name", "date", "total"], rows)
    }

    #[test]
    fn test_missing_columns_report_first_absent() {
        let t = Table::from_rows(["date", "amount"], vec![vec!["2024-01-01", "5"]]);
        let err = normalize(&t).unwrap_err();
        assert_eq!(err.to_string(), "Missing column: customer_name");

        let t = Table::from_rows(["customer_name", "date"], Vec::<Vec<&str>>::new());
        assert!(matches!(normalize(&t), Err(Error::MissingColumn(c)) if c == "total"));

        let t = Table::from_rows(["total", "customer_name"], Vec::<Vec<&str>>::new());
        assert!(matches!(normalize(&t), Err(Error::MissingColumn(c)) if c == "date"));
    }

    #[test]
    fn test_column_order_and_extras_are_irrelevant() {
        let t = Table::from_rows(
            ["total", "region", "date", "customer_name"],
            vec![vec!["12.5", "EU", "2024-02-03", "Alice"]],
        );
        let normalized = normalize(&t).unwrap();
        assert_eq!(normalized.len(), 1);
        let record = &normalized.records[0];
        assert_eq!(record.customer_name.as_deref(), Some("Alice"));
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 2, 3).unwrap());
        assert_eq!(record.total, Decimal::new(125, 1));
    }

    #[test]
    fn test_bad_dates_are_dropped() {
        let t = table(vec![
            vec!["Alice", "not a date", "100"],
            vec!["Bob", "", "50"],
            vec!["Carol", "2024-13-01", "10"],
            vec!["Dan", "2024-01-31", "1"],
        ]);
        let normalized = normalize(&t).unwrap();
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized.dropped_rows, 3);
        assert_eq!(normalized.records[0].customer_name.as_deref(), Some("Dan"));
    }

    #[test]
    fn test_bad_amounts_are_zeroed_not_dropped() {
        let t = table(vec![
            vec!["Alice", "2024-01-01", "abc"],
            vec!["Alice", "2024-01-02", ""],
            vec!["Alice", "2024-01-03", "$5"],
            vec!["Alice", "2024-01-04", "7"],
        ]);
        let normalized = normalize(&t).unwrap();
        assert_eq!(normalized.len(), 4);
        assert_eq!(normalized.coerced_amounts, 3);
        let totals: Vec<Decimal> = normalized.totals().collect();
        assert_eq!(
            totals,
            vec![Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, Decimal::new(7, 0)]
        );
    }

    #[test]
    fn test_blank_customer_is_absent() {
        let t = table(vec![vec!["  ", "2024-01-01", "3"]]);
        let normalized = normalize(&t).unwrap();
        assert_eq!(normalized.records[0].customer_name, None);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let t = table(vec![vec!["Alice", "bad", "x"]]);
        let before = t.clone();
        let _ = normalize(&t).unwrap();
        assert_eq!(t, before);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(parse_date("2024-03-15"), Some(expected));
        assert_eq!(parse_date(" 2024/03/15 "), Some(expected));
        assert_eq!(parse_date("03/15/2024"), Some(expected));
        assert_eq!(parse_date("15/03/2024"), Some(expected));
        assert_eq!(parse_date("20240315"), Some(expected));
        assert_eq!(parse_date("2024-03-15 13:45:00"), Some(expected));
        assert_eq!(parse_date("2024-03-15T13:45:00.250"), Some(expected));
        assert_eq!(parse_date("2024-03-15T23:00:00+02:00"), Some(expected));
        assert_eq!(parse_date("Mar 15, 2024"), Some(expected));
        assert_eq!(parse_date("March 15, 2024"), Some(expected));
        assert_eq!(parse_date("15 Mar 2024"), Some(expected));
        assert_eq!(parse_date("15 March 2024"), Some(expected));
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_month_only_dates_use_first_day() {
        let first = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert_eq!(parse_date("2024-01"), first);
        assert_eq!(parse_date("2024/01"), first);
        assert_eq!(parse_date("2024-13"), None);
        assert_eq!(parse_date("2024"), None);
        assert_eq!(parse_date("3/4"), None);
    }

    #[test]
    fn test_customer_names_are_kept_verbatim() {
        let t = table(vec![
            vec!["Alice", "2024-01-01", "1"],
            vec![" Alice", "2024-01-02", "2"],
        ]);
        let normalized = normalize(&t).unwrap();
        assert_eq!(normalized.records[0].customer_name.as_deref(), Some("Alice"));
        assert_eq!(normalized.records[1].customer_name.as_deref(), Some(" Alice"));
    }

    #[test]
    fn test_ambiguous_slash_dates_are_month_first() {
        assert_eq!(parse_date("04/05/2024"), NaiveDate::from_ymd_opt(2024, 4, 5));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("100"), Some(Decimal::new(100, 0)));
        assert_eq!(parse_amount(" -12.75 "), Some(Decimal::new(-1275, 2)));
        assert_eq!(parse_amount("+3"), Some(Decimal::new(3, 0)));
        assert_eq!(parse_amount("1.5e3"), Some(Decimal::new(1500, 0)));
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("1,000"), None);
        assert_eq!(parse_amount(""), None);
    }
}
