//! Reports module for SpendLens
//!
//! Spending summary, anomaly, forecast and budget allocation reports. Each
//! renders for the terminal and exports to CSV.

pub mod allocation;
pub mod anomaly;
pub mod forecast;
pub mod spending;

pub use allocation::{AllocationReport, AllocationRow};
pub use anomaly::AnomalyReport;
pub use forecast::{ForecastReport, ForecastRow};
pub use spending::{MonthlyTotal, SpendingByCategory, SpendingReport};
