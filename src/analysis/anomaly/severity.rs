//! Percentile-based severity banding
//!
//! Pure function of an amount and the within-category breakpoints, shared by
//! both detection strategies.

use crate::analysis::stats::quantile_sorted;
use crate::models::Severity;

/// Quantile at or above which a model-flagged amount is `medium`
pub const MEDIUM_QUANTILE: f64 = 0.90;
/// Quantile at or above which a model-flagged amount is `high`
pub const HIGH_QUANTILE: f64 = 0.97;

/// Within-category breakpoints for grading flagged amounts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeverityBands {
    pub medium: f64,
    pub high: f64,
}

impl SeverityBands {
    pub fn new(medium: f64, high: f64) -> Self {
        Self { medium, high }
    }

    /// Breakpoints taken from the category's own amounts; `None` when empty
    pub fn from_amounts(amounts: &[f64]) -> Option<Self> {
        if amounts.is_empty() {
            return None;
        }
        let mut sorted = amounts.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Some(Self::new(
            quantile_sorted(&sorted, MEDIUM_QUANTILE),
            quantile_sorted(&sorted, HIGH_QUANTILE),
        ))
    }

    pub fn grade(&self, amount: f64) -> Severity {
        if amount >= self.high {
            Severity::High
        } else if amount >= self.medium {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}
