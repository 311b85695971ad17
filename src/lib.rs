//! SpendLens - Terminal-based personal expense analysis
//!
//! This library provides the core functionality for the SpendLens expense
//! tracker: a JSON-backed expense store, CSV import and export, per-category
//! anomaly detection, daily spending forecasts and a linear-programming
//! budget optimizer.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Expenses, alerts and allocations
//! - `storage`: JSON file storage layer
//! - `analysis`: Anomaly detection and forecasting
//! - `optimizer`: Budget allocation as a linear program
//! - `services`: Business logic layer
//! - `reports`, `display`, `export`: Output formatting
//! - `cli`: Command handlers for the binary
//!
//! # Example
//!
//! ```rust,ignore
//! use spendlens::analysis::detect_anomalies;
//!
//! let alerts = detect_anomalies(&records, 90, 0.06)?;
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod optimizer;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{SpendError, SpendResult};
