//! Integration tests for the tally-core analytics pipeline
//!
//! These tests drive the full pipeline from CSV text and files on disk,
//! checking the report properties a dashboard relies on.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::io::Write;

use tempfile::{NamedTempFile, TempDir};

use tally_core::adapters::csv_table::{read_table_bytes, read_table_path};
use tally_core::config::{AnalyticsSettings, Config};
use tally_core::services::{AnalyticsService, EntryPoint, LoggingService};
use tally_core::{AnalyticsOutcome, AnalyticsReport, TallyContext};

// ============================================================================
// Test Helpers
// ============================================================================

fn create_service() -> AnalyticsService {
    AnalyticsService::new(
        AnalyticsSettings::default(),
        LoggingService::new(EntryPoint::Cli, "test"),
    )
    .expect("default settings are valid")
}

fn run_csv(csv: &str) -> AnalyticsOutcome {
    create_service().run_csv(csv.as_bytes(), "test")
}

fn report_for(csv: &str) -> AnalyticsReport {
    match run_csv(csv) {
        AnalyticsOutcome::Report(report) => report,
        AnalyticsOutcome::Failed { error } => panic!("expected a report, got error: {}", error),
    }
}

/// Build a CSV with one row per (customer, date, total)
fn csv_from_rows(rows: &[(&str, &str, &str)]) -> String {
    let mut csv = String::from("customer_name,date,total\n");
    for (customer, date, total) in rows {
        csv.push_str(&format!("{},{},{}\n", customer, date, total));
    }
    csv
}

// ============================================================================
// Fatal Errors
// ============================================================================

#[test]
fn test_each_missing_column_is_named() {
    let cases = [
        ("date,total\n2024-01-01,5\n", "customer_name"),
        ("customer_name,total\nAlice,5\n", "date"),
        ("customer_name,date\nAlice,2024-01-01\n", "total"),
        ("foo,bar\n1,2\n", "customer_name"),
    ];

    for (csv, column) in cases {
        let outcome = run_csv(csv);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, serde_json::json!({ "error": format!("Missing column: {}", column) }));
        assert_eq!(json.as_object().unwrap().len(), 1);
    }
}

#[test]
fn test_malformed_csv_is_fatal() {
    let outcome = run_csv("customer_name,date,total\nAlice,2024-01-01,5,extra\n");
    let error = outcome.error().expect("decode failure");
    assert!(error.starts_with("Failed to read CSV:"), "{}", error);
}

// ============================================================================
// Report Shape
// ============================================================================

#[test]
fn test_empty_table_gives_empty_success_shape() {
    let report = report_for("customer_name,date,total\n");
    assert!(report.top_customers.is_empty());
    assert!(report.months.is_empty());
    assert!(report.revenue_trend.is_empty());
    assert_eq!(report.prediction, 0);
    assert!(report.anomalies.is_empty());
}

#[test]
fn test_reference_example_json() {
    let csv = csv_from_rows(&[
        ("Alice", "2024-01-05", "100"),
        ("Bob", "2024-01-10", "200"),
        ("Alice", "2024-02-01", "50"),
    ]);
    let json = serde_json::to_value(run_csv(&csv)).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "top_customers": [
                { "customer": "Bob", "revenue": 200 },
                { "customer": "Alice", "revenue": 150 }
            ],
            "months": ["2024-01", "2024-02"],
            "revenue_trend": [300, 50],
            "prediction": -200,
            "anomalies": []
        })
    );
}

#[test]
fn test_extra_columns_and_order_are_ignored() {
    let csv = "id,total,region,customer_name,date\n1,10,EU,Alice,2024-05-01\n2,20,US,Bob,2024-05-02\n";
    let report = report_for(csv);
    assert_eq!(report.top_customers[0].customer, "Bob");
    assert_eq!(report.months, vec!["2024-05"]);
    assert_eq!(report.revenue_trend, vec![30]);
    assert_eq!(report.prediction, 30);
}

#[test]
fn test_top_customers_bounded_and_sorted() {
    let rows: Vec<(String, String, String)> = (0..12)
        .map(|i| (format!("cust{:02}", i), format!("2024-{:02}-01", i % 12 + 1), format!("{}", (i * 7919) % 500)))
        .collect();
    let borrowed: Vec<(&str, &str, &str)> = rows
        .iter()
        .map(|(a, b, c)| (a.as_str(), b.as_str(), c.as_str()))
        .collect();

    let report = report_for(&csv_from_rows(&borrowed));
    assert_eq!(report.top_customers.len(), 5);
    assert!(report
        .top_customers
        .windows(2)
        .all(|w| w[0].revenue >= w[1].revenue));
}

#[test]
fn test_months_parallel_and_strictly_increasing() {
    let csv = csv_from_rows(&[
        ("A", "2024-03-15", "10"),
        ("B", "2023-11-02", "20"),
        ("C", "2024-03-01", "30"),
        ("D", "2024-01-20", "40"),
        ("E", "2023-11-30", "50"),
    ]);
    let report = report_for(&csv);
    assert_eq!(report.months.len(), report.revenue_trend.len());
    assert!(report.months.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(report.months, vec!["2023-11", "2024-01", "2024-03"]);
    assert_eq!(report.revenue_trend, vec![70, 40, 40]);
}

// ============================================================================
// Degraded Input
// ============================================================================

#[test]
fn test_bad_dates_never_reach_the_trend() {
    let csv = csv_from_rows(&[
        ("Alice", "2024-01-05", "100"),
        ("Alice", "someday", "5000"),
        ("Bob", "", "7000"),
    ]);
    let report = report_for(&csv);
    assert_eq!(report.months, vec!["2024-01"]);
    assert_eq!(report.revenue_trend, vec![100]);
    assert_eq!(report.top_customers.len(), 1);
    assert_eq!(report.top_customers[0].revenue, 100);
}

#[test]
fn test_month_granular_ledger_is_reported() {
    let csv = csv_from_rows(&[("A", "2024-01", "100"), ("B", "2024-02", "200")]);
    let report = report_for(&csv);
    assert_eq!(report.months, vec!["2024-01", "2024-02"]);
    assert_eq!(report.revenue_trend, vec![100, 200]);
    assert_eq!(report.prediction, 300);
    assert_eq!(report.top_customers.len(), 2);
}

#[test]
fn test_textual_dates_are_understood() {
    let csv = "customer_name,date,total\nA,\"Jan 5, 2024\",10\nB,5 Feb 2024,20\n";
    let report = report_for(csv);
    assert_eq!(report.months, vec!["2024-01", "2024-02"]);
    assert_eq!(report.revenue_trend, vec![10, 20]);
}

#[test]
fn test_padded_customer_names_stay_distinct() {
    let csv = "customer_name,date,total\nAlice,2024-01-01,10\n\" Alice\",2024-01-02,20\n";
    let report = report_for(csv);
    assert_eq!(report.top_customers.len(), 2);
    assert_eq!(report.top_customers[0].customer, " Alice");
    assert_eq!(report.top_customers[1].customer, "Alice");
}

#[test]
fn test_bad_amounts_contribute_zero() {
    let csv = csv_from_rows(&[
        ("Alice", "2024-01-05", "100"),
        ("Bob", "2024-02-01", "oops"),
        ("Bob", "2024-02-09", ""),
    ]);
    let report = report_for(&csv);
    assert_eq!(report.months, vec!["2024-01", "2024-02"]);
    assert_eq!(report.revenue_trend, vec![100, 0]);
    // Bob keeps his group with zero revenue
    assert_eq!(report.top_customers[1].customer, "Bob");
    assert_eq!(report.top_customers[1].revenue, 0);
}

#[test]
fn test_amounts_at_decimal_limit_still_give_report() {
    let csv = csv_from_rows(&[
        ("Alice", "2024-01-01", "79228162514264337593543950335"),
        ("Alice", "2024-01-02", "79228162514264337593543950335"),
    ]);
    let report = report_for(&csv);
    assert_eq!(report.top_customers[0].customer, "Alice");
    assert_eq!(report.top_customers[0].revenue, i64::MAX);
    assert_eq!(report.months, vec!["2024-01"]);
    assert_eq!(report.revenue_trend, vec![i64::MAX]);
    assert_eq!(report.prediction, i64::MAX);

    let csv = csv_from_rows(&[
        ("Bob", "2024-01-01", "-79228162514264337593543950335"),
        ("Bob", "2024-02-01", "-79228162514264337593543950335"),
        ("Bob", "2024-02-02", "-79228162514264337593543950335"),
    ]);
    let report = report_for(&csv);
    assert_eq!(report.top_customers[0].revenue, i64::MIN);
    assert_eq!(report.revenue_trend, vec![i64::MIN, i64::MIN]);
}

#[test]
fn test_single_month_forecast_repeats_truncated_total() {
    let csv = csv_from_rows(&[("Alice", "2024-06-01", "10.75"), ("Bob", "2024-06-20", "5.5")]);
    let report = report_for(&csv);
    assert_eq!(report.revenue_trend, vec![16]);
    assert_eq!(report.prediction, 16);
}

// ============================================================================
// Anomalies
// ============================================================================

#[test]
fn test_no_anomalies_below_ten_rows() {
    let csv = csv_from_rows(&[
        ("A", "2024-01-01", "1"),
        ("A", "2024-01-02", "1"),
        ("A", "2024-01-03", "1"),
        ("A", "2024-01-04", "1"),
        ("A", "2024-01-05", "1"),
        ("A", "2024-01-06", "1"),
        ("A", "2024-01-07", "1"),
        ("A", "2024-01-08", "1"),
        ("A", "2024-01-09", "99999999"),
        // Dropped row does not count toward the threshold
        ("A", "never", "1"),
    ]);
    let report = report_for(&csv);
    assert!(report.anomalies.is_empty());
}

#[test]
fn test_extreme_transaction_is_reported() {
    let mut csv = String::from("customer_name,date,total\n");
    for day in 1..=28 {
        csv.push_str(&format!("Shop{},2024-02-{:02},{}\n", day % 4, day, 100 + day % 5));
    }
    csv.push_str("Whale,2024-03-03,25000.9\n");

    let report = report_for(&csv);
    assert!(
        report
            .anomalies
            .contains(&"Date 2024-03-03 — Suspicious total: 25000".to_string()),
        "anomalies: {:?}",
        report.anomalies
    );

    // Same input, same answer
    assert_eq!(report, report_for(&csv));
}

// ============================================================================
// Files and Context
// ============================================================================

#[test]
fn test_read_table_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "customer_name,date,total").unwrap();
    writeln!(file, "Alice,2024-01-05,100").unwrap();
    writeln!(file, "Bob,01/10/2024,200").unwrap();

    let table = read_table_path(file.path()).unwrap();
    assert_eq!(table.row_count(), 2);

    let report = create_service().report(&table, "test").unwrap();
    assert_eq!(report.months, vec!["2024-01"]);
    assert_eq!(report.revenue_trend, vec![300]);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = read_table_path(&dir.path().join("missing.csv")).unwrap_err();
    assert!(matches!(err, tally_core::Error::Io(_)));
}

#[test]
fn test_context_uses_settings_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("settings.json"),
        r#"{ "analytics": { "topCustomers": 1 } }"#,
    )
    .unwrap();

    let ctx = TallyContext::new(dir.path(), EntryPoint::Cli).unwrap();
    assert_eq!(ctx.config.analytics.top_customers, 1);

    let table = read_table_bytes(csv_from_rows(&[("A", "2024-01-01", "1"), ("B", "2024-01-01", "2")]).as_bytes()).unwrap();
    let report = ctx.analytics_service.report(&table, "test").unwrap();
    assert_eq!(report.top_customers.len(), 1);
    assert_eq!(report.top_customers[0].customer, "B");
}

#[test]
fn test_context_rejects_invalid_settings() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("settings.json"),
        r#"{ "analytics": { "contamination": 0.9 } }"#,
    )
    .unwrap();

    assert!(TallyContext::new(dir.path(), EntryPoint::Cli).is_err());
    assert!(TallyContext::from_config(Config::default(), EntryPoint::Cli).is_ok());
}
