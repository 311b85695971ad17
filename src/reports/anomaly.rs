//! Anomaly Report
//!
//! Lists the flagged expenses of the analysis window.

use std::io::Write;

use crate::display::format_amount;
use crate::error::{SpendError, SpendResult};
use crate::models::{AnomalyAlert, Severity};
use crate::services::AnalysisService;

#[derive(Debug, Clone)]
pub struct AnomalyReport {
    pub window_days: u32,
    /// Sorted by severity label, then amount descending
    pub alerts: Vec<AnomalyAlert>,
}

impl AnomalyReport {
    pub fn generate(service: &AnalysisService, window_days: u32) -> SpendResult<Self> {
        Ok(Self::new(window_days, service.anomalies(Some(window_days))?))
    }

    pub fn new(window_days: u32, alerts: Vec<AnomalyAlert>) -> Self {
        Self {
            window_days,
            alerts,
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.alerts.iter().filter(|a| a.severity == severity).count()
    }

    pub fn format_terminal(&self, symbol: &str) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "Unusual Expenses (last {} days)\n",
            self.window_days
        ));
        output.push_str(&"=".repeat(64));
        output.push('\n');

        if self.alerts.is_empty() {
            output.push_str("No unusual expenses found.\n");
            return output;
        }

        output.push_str(&format!(
            "{:<8} {:<20} {:<10} {:>16}\n",
            "Level", "Category", "Date", "Amount"
        ));
        output.push_str(&"-".repeat(64));
        output.push('\n');
        for alert in &self.alerts {
            output.push_str(&format!(
                "{:<8} {:<20} {:<10} {:>16}\n",
                alert.severity.as_str().to_uppercase(),
                alert.category,
                alert.date.format("%Y-%m-%d"),
                format_amount(alert.amount, symbol)
            ));
        }
        output.push_str(&"-".repeat(64));
        output.push('\n');
        output.push_str(&format!(
            "{} alert(s): {} high, {} medium, {} low\n",
            self.alerts.len(),
            self.count(Severity::High),
            self.count(Severity::Medium),
            self.count(Severity::Low)
        ));
        output
    }

    pub fn export_csv<W: Write>(&self, writer: &mut W) -> SpendResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["category", "date", "amount", "level"])
            .map_err(|e| SpendError::Export(e.to_string()))?;
        for alert in &self.alerts {
            csv.write_record([
                alert.category.clone(),
                alert.date.format("%Y-%m-%d").to_string(),
                format!("{:.2}", alert.amount),
                alert.severity.as_str().to_string(),
            ])
            .map_err(|e| SpendError::Export(e.to_string()))?;
        }
        csv.flush().map_err(|e| SpendError::Export(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn alerts() -> Vec<AnomalyAlert> {
        let d = NaiveDate::from_ymd_opt(2025, 4, 2).unwrap();
        vec![
            AnomalyAlert::new("food", d, 500.0, Severity::High),
            AnomalyAlert::new("fun", d, 220.0, Severity::Medium),
        ]
    }

    #[test]
    fn test_format_terminal() {
        let report = AnomalyReport::new(90, alerts());
        let output = report.format_terminal("$");
        assert!(output.contains("last 90 days"));
        assert!(output.contains("HIGH"));
        assert!(output.contains("500.00 $"));
        assert!(output.contains("2 alert(s): 1 high, 1 medium, 0 low"));

        let empty = AnomalyReport::new(30, Vec::new());
        assert!(empty.format_terminal("$").contains("No unusual expenses"));
    }

    #[test]
    fn test_export_csv() {
        let mut buffer = Vec::new();
        AnomalyReport::new(90, alerts()).export_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "category,date,amount,level\nfood,2025-04-02,500.00,high\nfun,2025-04-02,220.00,medium\n"
        );
    }
}
