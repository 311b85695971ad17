//! Budget allocation result model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Solver verdict for a budget optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverStatus {
    Optimal,
    Infeasible,
    Unbounded,
    Undetermined,
}

impl SolverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Optimal => "optimal",
            Self::Infeasible => "infeasible",
            Self::Unbounded => "unbounded",
            Self::Undetermined => "undetermined",
        }
    }

    pub fn is_optimal(&self) -> bool {
        matches!(self, Self::Optimal)
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a budget optimization: a status plus one amount per category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAllocation {
    pub status: SolverStatus,
    /// Monthly amount per category, never negative
    pub allocations: BTreeMap<String, f64>,
}

impl BudgetAllocation {
    pub fn new(status: SolverStatus, allocations: BTreeMap<String, f64>) -> Self {
        Self {
            status,
            allocations,
        }
    }

    /// Amount for a category, 0.0 when the category is unknown
    pub fn get(&self, category: &str) -> f64 {
        self.allocations.get(category).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.allocations.values().sum()
    }
}
