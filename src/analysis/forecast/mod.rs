//! Per-category daily spending forecast
//!
//! Categories with a short history get the mean of their most recent amounts.
//! Longer histories are fitted with gradient-boosted trees over calendar and
//! lag features, and the estimate is the model's prediction for the latest
//! row. Estimates feed the budget optimizer as baselines after
//! [`monthly_projection`].

pub mod boosting;
pub mod features;

pub use boosting::{BoostingConfig, GradientBoostedTrees};
pub use features::{build_features, FeatureRow, FEATURE_COUNT, FEATURE_NAMES};

use std::collections::BTreeMap;

use chrono::Datelike;
use tracing::{debug, info};

use crate::analysis::stats::mean;
use crate::config::ForecastSettings;
use crate::error::{SpendError, SpendResult};
use crate::models::ExpenseRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    /// Categories with fewer rows use the recent mean
    pub min_model_rows: usize,
    /// Rows averaged by the recent mean
    pub recent_window: usize,
    pub boosting: BoostingConfig,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self::from(&ForecastSettings::default())
    }
}

impl From<&ForecastSettings> for ForecastConfig {
    fn from(settings: &ForecastSettings) -> Self {
        Self {
            min_model_rows: settings.min_model_rows,
            recent_window: settings.recent_window,
            boosting: BoostingConfig {
                seed: settings.seed,
                ..BoostingConfig::default()
            },
        }
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> SpendResult<()> {
        if self.recent_window == 0 {
            return Err(SpendError::Analysis("recent_window must be at least 1".into()));
        }
        let b = &self.boosting;
        if !(b.learning_rate > 0.0 && b.learning_rate <= 1.0) {
            return Err(SpendError::Analysis(format!(
                "learning rate must be in (0, 1], got {}",
                b.learning_rate
            )));
        }
        if !(b.subsample > 0.0 && b.subsample <= 1.0) || !(b.colsample > 0.0 && b.colsample <= 1.0) {
            return Err(SpendError::Analysis("sampling ratios must be in (0, 1]".into()));
        }
        Ok(())
    }
}

/// How a category's estimate was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastMethod {
    RecentMean,
    BoostedTrees,
}

impl ForecastMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RecentMean => "recent-mean",
            Self::BoostedTrees => "boosted-trees",
        }
    }
}

/// Estimate for a single category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryForecast {
    pub daily: f64,
    pub method: ForecastMethod,
    pub rows: usize,
}

/// Daily estimate per category together with the method used
pub fn forecast_categories(
    records: &[ExpenseRecord],
    config: &ForecastConfig,
) -> SpendResult<BTreeMap<String, CategoryForecast>> {
    config.validate()?;
    for record in records {
        record.validate()?;
    }

    let mut by_category: BTreeMap<&str, Vec<&ExpenseRecord>> = BTreeMap::new();
    for record in records {
        by_category.entry(&record.category).or_default().push(record);
    }

    let mut out = BTreeMap::new();
    for (category, mut group) in by_category {
        group.sort_by_key(|r| r.date);
        let rows = group.len();

        let (daily, method) = if rows < config.min_model_rows {
            (recent_mean(&group, config.recent_window), ForecastMethod::RecentMean)
        } else {
            let features = build_features(&group);
            let targets: Vec<f64> = group.iter().map(|r| r.amount).collect();
            match GradientBoostedTrees::fit(&features, &targets, &config.boosting)
                .zip(features.last())
            {
                Some((model, last)) => (model.predict(last), ForecastMethod::BoostedTrees),
                None => (recent_mean(&group, config.recent_window), ForecastMethod::RecentMean),
            }
        };

        let daily = daily.max(0.0);
        debug!(category, rows, method = method.as_str(), daily, "forecast category");
        out.insert(category.to_string(), CategoryForecast { daily, method, rows });
    }

    info!(categories = out.len(), "forecast finished");
    Ok(out)
}

/// Daily spending estimate per category; empty input gives an empty map
pub fn forecast_daily(
    records: &[ExpenseRecord],
    config: &ForecastConfig,
) -> SpendResult<BTreeMap<String, f64>> {
    Ok(forecast_categories(records, config)?
        .into_iter()
        .map(|(category, forecast)| (category, forecast.daily))
        .collect())
}

fn recent_mean(group: &[&ExpenseRecord], window: usize) -> f64 {
    let amounts: Vec<f64> = group.iter().map(|r| r.amount).collect();
    let tail = if amounts.len() >= window {
        &amounts[amounts.len() - window..]
    } else {
        &amounts[..]
    };
    mean(tail).unwrap_or(0.0)
}

/// Scale daily estimates to a period of `days`
pub fn monthly_projection(daily: &BTreeMap<String, f64>, days: u32) -> BTreeMap<String, f64> {
    daily
        .iter()
        .map(|(category, value)| (category.clone(), value * f64::from(days)))
        .collect()
}

/// Mean calendar-month total per category
///
/// Only months in which the category has spending count toward its mean.
pub fn monthly_average_baseline(records: &[ExpenseRecord]) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<&str, BTreeMap<(i32, u32), f64>> = BTreeMap::new();
    for record in records {
        *totals
            .entry(&record.category)
            .or_default()
            .entry((record.date.year(), record.date.month()))
            .or_insert(0.0) += record.amount;
    }

    totals
        .into_iter()
        .map(|(category, months)| {
            let values: Vec<f64> = months.into_values().collect();
            (category.to_string(), mean(&values).unwrap_or(0.0))
        })
        .collect()
}
