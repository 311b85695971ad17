//! Configuration module for SpendLens
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - User settings persistence
//! - Analysis defaults

pub mod paths;
pub mod settings;

pub use paths::SpendPaths;
pub use settings::{AnomalySettings, BudgetSettings, ForecastSettings, Settings};
