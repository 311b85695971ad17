//! Analysis service
//!
//! Feeds stored expenses and user settings into the detector, the forecaster
//! and the budget optimizer.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::analysis::{
    forecast_categories, monthly_average_baseline, monthly_projection, AnomalyDetector,
    CategoryForecast, DetectorConfig, ForecastConfig,
};
use crate::config::Settings;
use crate::error::{SpendError, SpendResult};
use crate::models::{AnomalyAlert, BudgetAllocation};
use crate::optimizer::{BudgetBounds, BudgetOptimizer};
use crate::services::expense::{ExpenseFilter, ExpenseService};
use crate::storage::Storage;

/// Where the optimizer's per-category targets come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaselineKind {
    /// Daily forecast projected to a month
    #[default]
    Forecast,
    /// Mean of past calendar-month totals
    Average,
}

impl BaselineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forecast => "forecast",
            Self::Average => "average",
        }
    }
}

impl fmt::Display for BaselineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BaselineKind {
    type Err = SpendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "forecast" => Ok(Self::Forecast),
            "average" | "avg" => Ok(Self::Average),
            other => Err(SpendError::Validation(format!(
                "Unknown baseline '{}' (expected forecast or average)",
                other
            ))),
        }
    }
}

/// Inputs of one optimization run
#[derive(Debug, Clone, Default)]
pub struct OptimizeRequest {
    /// Falls back to the configured income
    pub monthly_income: Option<f64>,
    /// Falls back to the configured savings target
    pub savings_target: Option<f64>,
    pub baseline: BaselineKind,
    pub bounds: BudgetBounds,
}

/// Baseline and allocation produced by one optimization run
#[derive(Debug, Clone)]
pub struct OptimizeOutcome {
    pub baseline: BTreeMap<String, f64>,
    pub baseline_kind: BaselineKind,
    pub monthly_income: f64,
    pub savings_target: f64,
    pub allocation: BudgetAllocation,
}

impl OptimizeOutcome {
    pub fn available(&self) -> f64 {
        self.monthly_income - self.savings_target
    }
}

/// Service bridging storage and settings to the analysis code
pub struct AnalysisService<'a> {
    storage: &'a Storage,
    settings: &'a Settings,
}

impl<'a> AnalysisService<'a> {
    pub fn new(storage: &'a Storage, settings: &'a Settings) -> Self {
        Self { storage, settings }
    }

    /// Anomalies over all stored expenses, with an optional window override
    pub fn anomalies(&self, window_days: Option<u32>) -> SpendResult<Vec<AnomalyAlert>> {
        let mut config = DetectorConfig::from(&self.settings.anomaly);
        if let Some(days) = window_days {
            config.window_days = days;
        }
        let records = ExpenseService::new(self.storage).records(&ExpenseFilter::new())?;
        AnomalyDetector::new(config)?.detect(&records)
    }

    /// Daily estimate and method per category
    pub fn forecast(&self) -> SpendResult<BTreeMap<String, CategoryForecast>> {
        let records = ExpenseService::new(self.storage).records(&ExpenseFilter::new())?;
        forecast_categories(&records, &ForecastConfig::from(&self.settings.forecast))
    }

    /// Per-category monthly targets of the given kind
    pub fn baseline(&self, kind: BaselineKind) -> SpendResult<BTreeMap<String, f64>> {
        match kind {
            BaselineKind::Forecast => {
                let daily: BTreeMap<String, f64> = self
                    .forecast()?
                    .into_iter()
                    .map(|(category, f)| (category, f.daily))
                    .collect();
                Ok(monthly_projection(
                    &daily,
                    self.settings.forecast.projection_days,
                ))
            }
            BaselineKind::Average => {
                let records = ExpenseService::new(self.storage).records(&ExpenseFilter::new())?;
                Ok(monthly_average_baseline(&records))
            }
        }
    }

    pub fn optimize(&self, request: &OptimizeRequest) -> SpendResult<OptimizeOutcome> {
        let monthly_income = request
            .monthly_income
            .unwrap_or(self.settings.budget.monthly_income);
        let savings_target = request
            .savings_target
            .unwrap_or(self.settings.budget.savings_target);

        let baseline = self.baseline(request.baseline)?;
        let allocation = BudgetOptimizer::new().optimize(
            &baseline,
            monthly_income,
            savings_target,
            &request.bounds,
        )?;

        Ok(OptimizeOutcome {
            baseline,
            baseline_kind: request.baseline,
            monthly_income,
            savings_target,
            allocation,
        })
    }
}
