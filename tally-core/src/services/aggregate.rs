//! Top customers and monthly revenue aggregation

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::domain::{
    saturating_add, truncate_amount, CustomerRevenue, MonthlyBucket, NormalizedTable,
};

/// Sum totals per customer and keep the `limit` largest.
///
/// Groups are ordered by name before the stable descending sort, so
/// equal totals come out in name order. Rows without a customer name
/// belong to no group.
pub fn top_customers(table: &NormalizedTable, limit: usize) -> Vec<CustomerRevenue> {
    let mut sums: BTreeMap<&str, Decimal> = BTreeMap::new();
    for record in &table.records {
        if let Some(name) = record.customer_name.as_deref() {
            let sum = sums.entry(name).or_default();
            *sum = saturating_add(*sum, record.total);
        }
    }

    let mut ranked: Vec<(&str, Decimal)> = sums.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(limit)
        .map(|(name, total)| CustomerRevenue {
            customer: name.to_string(),
            revenue: truncate_amount(total),
        })
        .collect()
}

/// Sum totals per `YYYY-MM` label, ascending by label
pub fn monthly_revenue(table: &NormalizedTable) -> Vec<MonthlyBucket> {
    let mut sums: BTreeMap<String, Decimal> = BTreeMap::new();
    for record in &table.records {
        let sum = sums.entry(record.month_label()).or_default();
        *sum = saturating_add(*sum, record.total);
    }

    sums.into_iter()
        .map(|(month, revenue)| MonthlyBucket { month, revenue })
        .collect()
}

/// Split buckets into the report's two aligned sequences
pub fn trend_series(buckets: &[MonthlyBucket]) -> (Vec<String>, Vec<i64>) {
    buckets
        .iter()
        .map(|b| (b.month.clone(), b.truncated_revenue()))
        .unzip()
}
