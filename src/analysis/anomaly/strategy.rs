//! Per-category detection strategies
//!
//! A category is analyzed either with an empirical percentile rule (too few
//! records for a density model) or with an isolation forest. The choice is
//! made once per category from its sample count.

use crate::analysis::stats::quantile;
use crate::models::Severity;

use super::isolation_forest::{IsolationForest, IsolationForestConfig};
use super::severity::SeverityBands;

/// Quantile used as the flag threshold by the percentile rule
pub const SMALL_SAMPLE_QUANTILE: f64 = 0.95;

#[derive(Debug, Clone, PartialEq)]
pub enum DetectionStrategy {
    /// Flag every amount at or above the given quantile as `medium`
    PercentileRule { quantile: f64 },
    /// Let an isolation forest decide, then grade with [`SeverityBands`]
    IsolationModel(IsolationForestConfig),
}

impl DetectionStrategy {
    /// Pick the strategy for a category with `sample_count` records
    pub fn select(
        sample_count: usize,
        min_model_samples: usize,
        model: &IsolationForestConfig,
    ) -> Self {
        if sample_count < min_model_samples {
            Self::PercentileRule {
                quantile: SMALL_SAMPLE_QUANTILE,
            }
        } else {
            Self::IsolationModel(model.clone())
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PercentileRule { .. } => "percentile-rule",
            Self::IsolationModel(_) => "isolation-forest",
        }
    }

    /// Severity for each amount, `None` for amounts that are not flagged
    pub fn classify(&self, amounts: &[f64]) -> Vec<Option<Severity>> {
        match self {
            Self::PercentileRule { quantile: q } => {
                let Some(threshold) = quantile(amounts, *q) else {
                    return Vec::new();
                };
                amounts
                    .iter()
                    .map(|&a| (a >= threshold).then_some(Severity::Medium))
                    .collect()
            }
            Self::IsolationModel(config) => {
                let Some(bands) = SeverityBands::from_amounts(amounts) else {
                    return Vec::new();
                };
                IsolationForest::fit_predict(amounts, config)
                    .into_iter()
                    .zip(amounts)
                    .map(|(flagged, &a)| flagged.then(|| bands.grade(a)))
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_by_sample_count() {
        let model = IsolationForestConfig::default();
        assert_eq!(
            DetectionStrategy::select(19, 20, &model),
            DetectionStrategy::PercentileRule { quantile: 0.95 }
        );
        assert_eq!(
            DetectionStrategy::select(20, 20, &model).name(),
            "isolation-forest"
        );
    }

    #[test]
    fn test_percentile_rule_flags_top_as_medium() {
        let amounts = [12.0, 15.0, 11.0, 300.0, 14.0];
        let rule = DetectionStrategy::PercentileRule { quantile: 0.95 };
        let labels = rule.classify(&amounts);
        assert_eq!(
            labels,
            vec![None, None, None, Some(Severity::Medium), None]
        );
    }

    #[test]
    fn test_percentile_rule_single_record_is_flagged() {
        let rule = DetectionStrategy::PercentileRule { quantile: 0.95 };
        assert_eq!(rule.classify(&[42.0]), vec![Some(Severity::Medium)]);
        assert!(rule.classify(&[]).is_empty());
    }

    #[test]
    fn test_isolation_model_grades_extreme_as_high() {
        let mut amounts: Vec<f64> = (0..24).map(|i| 10.0 + (i % 8) as f64 * 5.0).collect();
        amounts.push(500.0);
        let model = DetectionStrategy::IsolationModel(IsolationForestConfig::default());
        let labels = model.classify(&amounts);

        assert_eq!(labels.len(), amounts.len());
        assert_eq!(labels[24], Some(Severity::High));
    }
}
