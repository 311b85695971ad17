//! Allocation Report
//!
//! Baseline against optimized allocation per category, with the totals
//! compared to the available amount.

use std::io::Write;

use crate::display::format_amount;
use crate::error::{SpendError, SpendResult};
use crate::models::SolverStatus;
use crate::services::{AnalysisService, OptimizeOutcome, OptimizeRequest};

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationRow {
    pub category: String,
    pub baseline: f64,
    pub allocated: f64,
}

impl AllocationRow {
    /// Allocated minus baseline
    pub fn difference(&self) -> f64 {
        self.allocated - self.baseline
    }
}

#[derive(Debug, Clone)]
pub struct AllocationReport {
    pub status: SolverStatus,
    pub baseline_kind: String,
    pub monthly_income: f64,
    pub savings_target: f64,
    pub rows: Vec<AllocationRow>,
}

impl AllocationReport {
    pub fn generate(service: &AnalysisService, request: &OptimizeRequest) -> SpendResult<Self> {
        Ok(Self::from_outcome(&service.optimize(request)?))
    }

    pub fn from_outcome(outcome: &OptimizeOutcome) -> Self {
        let rows = outcome
            .baseline
            .iter()
            .map(|(category, &baseline)| AllocationRow {
                category: category.clone(),
                baseline,
                allocated: outcome.allocation.get(category),
            })
            .collect();

        Self {
            status: outcome.allocation.status,
            baseline_kind: outcome.baseline_kind.to_string(),
            monthly_income: outcome.monthly_income,
            savings_target: outcome.savings_target,
            rows,
        }
    }

    pub fn available(&self) -> f64 {
        self.monthly_income - self.savings_target
    }

    pub fn total_allocated(&self) -> f64 {
        self.rows.iter().map(|r| r.allocated).sum()
    }

    pub fn total_baseline(&self) -> f64 {
        self.rows.iter().map(|r| r.baseline).sum()
    }

    pub fn format_terminal(&self, symbol: &str) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "Budget Optimization ({} baseline)\n",
            self.baseline_kind
        ));
        output.push_str(&"=".repeat(72));
        output.push('\n');
        output.push_str(&format!("Status:          {}\n", self.status));
        output.push_str(&format!(
            "Monthly income:  {}\n",
            format_amount(self.monthly_income, symbol)
        ));
        output.push_str(&format!(
            "Savings target:  {}\n",
            format_amount(self.savings_target, symbol)
        ));
        output.push_str(&format!(
            "Available:       {}\n\n",
            format_amount(self.available(), symbol)
        ));

        if self.rows.is_empty() {
            output.push_str("No categories to allocate. Add some expenses first.\n");
            return output;
        }

        output.push_str(&format!(
            "{:<20} {:>16} {:>16} {:>16}\n",
            "Category", "Baseline", "Allocated", "Difference"
        ));
        output.push_str(&"-".repeat(72));
        output.push('\n');
        for row in &self.rows {
            output.push_str(&format!(
                "{:<20} {:>16} {:>16} {:>16}\n",
                row.category,
                format_amount(row.baseline, symbol),
                format_amount(row.allocated, symbol),
                format_amount(row.difference(), symbol)
            ));
        }
        output.push_str(&"-".repeat(72));
        output.push('\n');
        output.push_str(&format!(
            "{:<20} {:>16} {:>16} {:>16}\n",
            "TOTAL",
            format_amount(self.total_baseline(), symbol),
            format_amount(self.total_allocated(), symbol),
            format_amount(self.total_allocated() - self.total_baseline(), symbol)
        ));
        output.push_str(&format!(
            "\nAllocated {} of {} available\n",
            format_amount(self.total_allocated(), symbol),
            format_amount(self.available(), symbol)
        ));
        output
    }

    pub fn export_csv<W: Write>(&self, writer: &mut W) -> SpendResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["category", "baseline", "allocated", "difference", "status"])
            .map_err(|e| SpendError::Export(e.to_string()))?;
        for row in &self.rows {
            csv.write_record([
                row.category.clone(),
                format!("{:.2}", row.baseline),
                format!("{:.2}", row.allocated),
                format!("{:.2}", row.difference()),
                self.status.to_string(),
            ])
            .map_err(|e| SpendError::Export(e.to_string()))?;
        }
        csv.flush().map_err(|e| SpendError::Export(e.to_string()))?;
        Ok(())
    }
}
