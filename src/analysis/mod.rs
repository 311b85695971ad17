//! Spending analysis: anomaly detection and forecasting

pub mod anomaly;
pub mod forecast;
pub mod stats;

pub use anomaly::{detect_anomalies, AnomalyDetector, DetectorConfig};
pub use forecast::{
    forecast_categories, forecast_daily, monthly_average_baseline, monthly_projection,
    CategoryForecast, ForecastConfig, ForecastMethod,
};
