//! Per-category anomaly detection
//!
//! Restricts the records to a recent window, splits them by category, runs
//! the strategy chosen for each category's sample size and returns the
//! flagged expenses as sorted alerts.

pub mod isolation_forest;
pub mod severity;
pub mod strategy;

pub use isolation_forest::{IsolationForest, IsolationForestConfig};
pub use severity::SeverityBands;
pub use strategy::DetectionStrategy;

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use tracing::{debug, info};

use crate::config::AnomalySettings;
use crate::error::{SpendError, SpendResult};
use crate::models::{sort_alerts, AnomalyAlert, ExpenseRecord};

/// Detector parameters
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Days before the latest record still analyzed (inclusive)
    pub window_days: u32,
    /// Expected outlier share, strictly between 0 and 0.5
    pub contamination: f64,
    pub seed: u64,
    /// Categories below this size use the percentile rule
    pub min_model_samples: usize,
    pub tree_count: usize,
    pub max_samples: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::from(&AnomalySettings::default())
    }
}

impl From<&AnomalySettings> for DetectorConfig {
    fn from(settings: &AnomalySettings) -> Self {
        Self {
            window_days: settings.window_days,
            contamination: settings.contamination,
            seed: settings.seed,
            min_model_samples: settings.min_model_samples,
            tree_count: settings.tree_count,
            max_samples: settings.max_samples,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> SpendResult<()> {
        if self.window_days == 0 {
            return Err(SpendError::Analysis("window_days must be at least 1".into()));
        }
        if !(self.contamination > 0.0 && self.contamination < 0.5) {
            return Err(SpendError::Analysis(format!(
                "contamination must be in (0, 0.5), got {}",
                self.contamination
            )));
        }
        if self.tree_count == 0 {
            return Err(SpendError::Analysis("tree_count must be positive".into()));
        }
        Ok(())
    }

    fn model(&self) -> IsolationForestConfig {
        IsolationForestConfig {
            tree_count: self.tree_count,
            max_samples: self.max_samples,
            contamination: self.contamination,
            seed: self.seed,
        }
    }
}

/// Stateless detector; `detect` can be called any number of times
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    config: DetectorConfig,
}

impl AnomalyDetector {
    pub fn new(config: DetectorConfig) -> SpendResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// First date still inside the analysis window, given the latest date
    pub fn window_start(&self, latest: NaiveDate) -> NaiveDate {
        latest
            .checked_sub_days(Days::new(u64::from(self.config.window_days)))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Flag unusual expenses
    ///
    /// Fails on a record with a non-positive or non-finite amount or an
    /// empty category. An empty input yields an empty list.
    pub fn detect(&self, records: &[ExpenseRecord]) -> SpendResult<Vec<AnomalyAlert>> {
        for record in records {
            record.validate()?;
        }

        let Some(latest) = records.iter().map(|r| r.date).max() else {
            return Ok(Vec::new());
        };
        let start = self.window_start(latest);

        let mut by_category: BTreeMap<&str, Vec<&ExpenseRecord>> = BTreeMap::new();
        for record in records.iter().filter(|r| r.date >= start) {
            by_category.entry(&record.category).or_default().push(record);
        }

        let model = self.config.model();
        let mut alerts = Vec::new();

        for (category, mut group) in by_category {
            if group.is_empty() {
                continue;
            }
            group.sort_by_key(|r| r.date);

            let amounts: Vec<f64> = group.iter().map(|r| r.amount).collect();
            let strategy =
                DetectionStrategy::select(amounts.len(), self.config.min_model_samples, &model);
            let labels = strategy.classify(&amounts);

            let before = alerts.len();
            alerts.extend(group.iter().zip(labels).filter_map(|(record, label)| {
                label.map(|severity| {
                    AnomalyAlert::new(category, record.date, record.amount, severity)
                })
            }));

            debug!(
                category,
                records = amounts.len(),
                strategy = strategy.name(),
                flagged = alerts.len() - before,
                "analyzed category"
            );
        }

        sort_alerts(&mut alerts);
        info!(
            records = records.len(),
            window_start = %start,
            alerts = alerts.len(),
            "anomaly detection finished"
        );
        Ok(alerts)
    }
}

/// Detect anomalies with default model settings and the given window and
/// contamination
pub fn detect_anomalies(
    records: &[ExpenseRecord],
    window_days: u32,
    contamination: f64,
) -> SpendResult<Vec<AnomalyAlert>> {
    let config = DetectorConfig {
        window_days,
        contamination,
        ..DetectorConfig::default()
    };
    AnomalyDetector::new(config)?.detect(records)
}
