//! Forecast Report
//!
//! Daily estimate and monthly projection per category, largest first.

use std::collections::BTreeMap;
use std::io::Write;

use crate::analysis::CategoryForecast;
use crate::display::format_amount;
use crate::error::{SpendError, SpendResult};
use crate::services::AnalysisService;

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    pub category: String,
    pub daily: f64,
    pub monthly: f64,
    /// `recent-mean` or `boosted-trees`
    pub method: &'static str,
    pub history: usize,
}

#[derive(Debug, Clone)]
pub struct ForecastReport {
    pub projection_days: u32,
    pub rows: Vec<ForecastRow>,
}

impl ForecastReport {
    pub fn generate(service: &AnalysisService, projection_days: u32) -> SpendResult<Self> {
        Ok(Self::from_forecasts(&service.forecast()?, projection_days))
    }

    pub fn from_forecasts(
        forecasts: &BTreeMap<String, CategoryForecast>,
        projection_days: u32,
    ) -> Self {
        let mut rows: Vec<ForecastRow> = forecasts
            .iter()
            .map(|(category, f)| ForecastRow {
                category: category.clone(),
                daily: f.daily,
                monthly: f.daily * f64::from(projection_days),
                method: f.method.as_str(),
                history: f.rows,
            })
            .collect();
        rows.sort_by(|a, b| b.monthly.total_cmp(&a.monthly));

        Self {
            projection_days,
            rows,
        }
    }

    pub fn total_monthly(&self) -> f64 {
        self.rows.iter().map(|r| r.monthly).sum()
    }

    pub fn format_terminal(&self, symbol: &str) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "Spending Forecast ({}-day projection)\n",
            self.projection_days
        ));
        output.push_str(&"=".repeat(78));
        output.push('\n');

        if self.rows.is_empty() {
            output.push_str("Not enough data to forecast. Add some expenses first.\n");
            return output;
        }

        output.push_str(&format!(
            "{:<20} {:>14} {:>16} {:<14} {:>8}\n",
            "Category", "Daily", "Projected", "Method", "Rows"
        ));
        output.push_str(&"-".repeat(78));
        output.push('\n');
        for row in &self.rows {
            output.push_str(&format!(
                "{:<20} {:>14} {:>16} {:<14} {:>8}\n",
                row.category,
                format_amount(row.daily, symbol),
                format_amount(row.monthly, symbol),
                row.method,
                row.history
            ));
        }
        output.push_str(&"-".repeat(78));
        output.push('\n');
        output.push_str(&format!(
            "{:<20} {:>14} {:>16}\n",
            "TOTAL",
            "",
            format_amount(self.total_monthly(), symbol)
        ));
        if self.rows.iter().any(|r| r.method == "recent-mean") {
            output.push_str("\nCategories with short histories use a simple recent mean.\n");
        }
        output
    }

    pub fn export_csv<W: Write>(&self, writer: &mut W) -> SpendResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["category", "daily", "monthly", "method", "rows"])
            .map_err(|e| SpendError::Export(e.to_string()))?;
        for row in &self.rows {
            csv.write_record([
                row.category.clone(),
                format!("{:.2}", row.daily),
                format!("{:.2}", row.monthly),
                row.method.to_string(),
                row.history.to_string(),
            ])
            .map_err(|e| SpendError::Export(e.to_string()))?;
        }
        csv.flush().map_err(|e| SpendError::Export(e.to_string()))?;
        Ok(())
    }
}
