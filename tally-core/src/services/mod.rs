//! Service layer - analytics pipeline stages and their orchestration
//!
//! Each stage is a plain function over the working set; `AnalyticsService`
//! runs them in order and turns fatal errors into the error payload.

pub mod aggregate;
mod analytics;
pub mod anomaly;
pub mod forecast;
pub mod logging;
pub mod normalize;

pub use aggregate::{monthly_revenue, top_customers, trend_series};
pub use analytics::{AnalyticsService, ReportDetails};
pub use anomaly::{detect_anomalies, AnomalyScan, ForestParams, IsolationForest};
pub use forecast::{forecast_next, Forecast, LinearTrend};
pub use logging::{EntryPoint, LogEvent, LoggingService};
pub use normalize::{normalize, REQUIRED_COLUMNS};
