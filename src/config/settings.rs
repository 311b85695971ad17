//! User settings for SpendLens
//!
//! Manages display preferences and the defaults used by the anomaly detector,
//! the forecaster and the budget optimizer.

use serde::{Deserialize, Serialize};

use super::paths::SpendPaths;
use crate::error::SpendError;

/// Anomaly detector defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalySettings {
    /// Days before the latest expense that are still analyzed
    pub window_days: u32,
    /// Expected outlier fraction, strictly between 0 and 0.5
    pub contamination: f64,
    /// Seed for the isolation forest
    pub seed: u64,
    /// Categories with fewer records fall back to the percentile rule
    pub min_model_samples: usize,
    /// Number of isolation trees
    pub tree_count: usize,
    /// Maximum subsample drawn per tree
    pub max_samples: usize,
}

impl Default for AnomalySettings {
    fn default() -> Self {
        Self {
            window_days: 90,
            contamination: 0.06,
            seed: 42,
            min_model_samples: 20,
            tree_count: 100,
            max_samples: 256,
        }
    }
}

/// Forecaster defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    /// Days used when projecting a daily estimate to a month
    pub projection_days: u32,
    /// Categories with fewer rows use the recent-mean estimate
    pub min_model_rows: usize,
    /// Rows averaged by the recent-mean estimate
    pub recent_window: usize,
    /// Seed for row subsampling in the boosted model
    pub seed: u64,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            projection_days: 30,
            min_model_rows: 40,
            recent_window: 14,
            seed: 42,
        }
    }
}

/// Optimizer defaults, overridable per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetSettings {
    pub monthly_income: f64,
    pub savings_target: f64,
}

impl Default for BudgetSettings {
    fn default() -> Self {
        Self {
            monthly_income: 8000.0,
            savings_target: 1000.0,
        }
    }
}

/// User settings for SpendLens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol appended to amounts in reports
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    #[serde(default)]
    pub anomaly: AnomalySettings,

    #[serde(default)]
    pub forecast: ForecastSettings,

    #[serde(default)]
    pub budget: BudgetSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            anomaly: AnomalySettings::default(),
            forecast: ForecastSettings::default(),
            budget: BudgetSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &SpendPaths) -> Result<Self, SpendError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| SpendError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| SpendError::Config(format!("Failed to parse settings file: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &SpendPaths) -> Result<(), SpendError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| SpendError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| SpendError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Reject values the analysis code cannot work with
    pub fn validate(&self) -> Result<(), SpendError> {
        let anomaly = &self.anomaly;
        if anomaly.window_days == 0 {
            return Err(SpendError::Config("anomaly.window_days must be at least 1".into()));
        }
        if !(anomaly.contamination > 0.0 && anomaly.contamination < 0.5) {
            return Err(SpendError::Config(format!(
                "anomaly.contamination must be in (0, 0.5), got {}",
                anomaly.contamination
            )));
        }
        if anomaly.tree_count == 0 || anomaly.max_samples < 2 {
            return Err(SpendError::Config(
                "anomaly.tree_count must be positive and anomaly.max_samples at least 2".into(),
            ));
        }
        if self.forecast.projection_days == 0 || self.forecast.recent_window == 0 {
            return Err(SpendError::Config(
                "forecast.projection_days and forecast.recent_window must be positive".into(),
            ));
        }
        if self.budget.monthly_income < 0.0 || self.budget.savings_target < 0.0 {
            return Err(SpendError::Config(
                "budget.monthly_income and budget.savings_target must not be negative".into(),
            ));
        }
        Ok(())
    }
}
