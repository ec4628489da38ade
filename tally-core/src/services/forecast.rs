//! One-period-ahead revenue forecast

use rust_decimal::prelude::ToPrimitive;

use crate::domain::{truncate_amount, truncate_float, MonthlyBucket};

/// Ordinary least-squares line `revenue = intercept + slope * index`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    /// Fit against 1-based indices; `None` for fewer than two points
    pub fn fit(values: &[f64]) -> Option<Self> {
        if values.len() < 2 {
            return None;
        }

        let n = values.len() as f64;
        let mean_x = (n + 1.0) / 2.0;
        let mean_y = values.iter().sum::<f64>() / n;

        let (mut sxy, mut sxx) = (0.0, 0.0);
        for (i, y) in values.iter().enumerate() {
            let dx = (i + 1) as f64 - mean_x;
            sxy += dx * (y - mean_y);
            sxx += dx * dx;
        }

        // sxx > 0 whenever there are two distinct indices
        let slope = sxy / sxx;
        Some(Self { slope, intercept: mean_y - slope * mean_x })
    }

    pub fn predict(&self, index: f64) -> f64 {
        self.intercept + self.slope * index
    }
}

/// Forecast for the month after the last bucket, plus the fitted line
/// when there was enough history to fit one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Forecast {
    pub prediction: i64,
    pub trend: Option<LinearTrend>,
}

/// Predict the next period from the monthly series.
///
/// Zero months forecast 0 and one month repeats its own revenue.
pub fn forecast_next(buckets: &[MonthlyBucket]) -> Forecast {
    match buckets {
        [] => Forecast { prediction: 0, trend: None },
        [only] => Forecast { prediction: truncate_amount(only.revenue), trend: None },
        _ => {
            let values: Vec<f64> = buckets
                .iter()
                .map(|b| b.revenue.to_f64().unwrap_or(0.0))
                .collect();
            match LinearTrend::fit(&values) {
                Some(trend) => Forecast {
                    prediction: truncate_float(trend.predict((values.len() + 1) as f64)),
                    trend: Some(trend),
                },
                None => Forecast { prediction: 0, trend: None },
            }
        }
    }
}
