//! Spending Report
//!
//! Dashboard summary of stored expenses: current-month total, top category,
//! average per active day, monthly totals and per-category shares.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::{Datelike, NaiveDate};

use crate::display::{format_amount, format_bar, format_percentage};
use crate::error::{SpendError, SpendResult};
use crate::models::Expense;
use crate::services::{ExpenseFilter, ExpenseService};
use crate::storage::Storage;

/// Spending breakdown by category
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingByCategory {
    pub category: String,
    pub total: f64,
    pub count: usize,
    /// Share of total spending, 0-100
    pub percentage: f64,
}

/// Total for one calendar month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub total: f64,
}

impl MonthlyTotal {
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Spending Report
#[derive(Debug, Clone)]
pub struct SpendingReport {
    /// Reference date; its month is the "current" month
    pub as_of: NaiveDate,
    pub total_this_month: f64,
    pub top_category: Option<String>,
    /// Mean of daily totals over days with at least one expense
    pub average_per_active_day: f64,
    /// Chronological
    pub monthly: Vec<MonthlyTotal>,
    /// Largest total first
    pub categories: Vec<SpendingByCategory>,
    pub total_spending: f64,
    pub total_expenses: usize,
}

impl SpendingReport {
    /// Generate a spending report over all stored expenses
    pub fn generate(storage: &Storage, as_of: NaiveDate) -> SpendResult<Self> {
        let expenses = ExpenseService::new(storage).list(&ExpenseFilter::new())?;
        Ok(Self::from_expenses(&expenses, as_of))
    }

    pub fn from_expenses(expenses: &[Expense], as_of: NaiveDate) -> Self {
        let mut by_category: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        let mut by_month: BTreeMap<(i32, u32), f64> = BTreeMap::new();
        let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        let mut total_this_month = 0.0;

        for expense in expenses {
            let entry = by_category.entry(&expense.category).or_insert((0.0, 0));
            entry.0 += expense.amount;
            entry.1 += 1;

            let key = (expense.date.year(), expense.date.month());
            *by_month.entry(key).or_insert(0.0) += expense.amount;
            *by_day.entry(expense.date).or_insert(0.0) += expense.amount;

            if key == (as_of.year(), as_of.month()) {
                total_this_month += expense.amount;
            }
        }

        let total_spending: f64 = by_category.values().map(|(total, _)| total).sum();

        let mut categories: Vec<SpendingByCategory> = by_category
            .into_iter()
            .map(|(category, (total, count))| SpendingByCategory {
                category: category.to_string(),
                total,
                count,
                percentage: if total_spending > 0.0 {
                    total / total_spending * 100.0
                } else {
                    0.0
                },
            })
            .collect();
        // ties keep alphabetical order
        categories.sort_by(|a, b| b.total.total_cmp(&a.total));

        let average_per_active_day = if by_day.is_empty() {
            0.0
        } else {
            by_day.values().sum::<f64>() / by_day.len() as f64
        };

        Self {
            as_of,
            total_this_month,
            top_category: categories.first().map(|c| c.category.clone()),
            average_per_active_day,
            monthly: by_month
                .into_iter()
                .map(|((year, month), total)| MonthlyTotal { year, month, total })
                .collect(),
            categories,
            total_spending,
            total_expenses: expenses.len(),
        }
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, symbol: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!("Spending Summary (as of {})\n", self.as_of));
        output.push_str(&"=".repeat(72));
        output.push('\n');

        if self.total_expenses == 0 {
            output.push_str("No expenses recorded yet.\n");
            return output;
        }

        output.push_str(&format!(
            "Total this month:       {}\n",
            format_amount(self.total_this_month, symbol)
        ));
        output.push_str(&format!(
            "Top category:           {}\n",
            self.top_category.as_deref().unwrap_or("-")
        ));
        output.push_str(&format!(
            "Average per active day: {}\n",
            format_amount(self.average_per_active_day, symbol)
        ));
        output.push_str(&format!(
            "All-time total:         {} ({} expenses)\n\n",
            format_amount(self.total_spending, symbol),
            self.total_expenses
        ));

        output.push_str("Monthly totals\n");
        output.push_str(&"-".repeat(72));
        output.push('\n');
        let max_month = self.monthly.iter().map(|m| m.total).fold(0.0, f64::max);
        for month in &self.monthly {
            output.push_str(&format!(
                "{:<10} {:>16} {}\n",
                month.label(),
                format_amount(month.total, symbol),
                format_bar(month.total, max_month, 30)
            ));
        }

        output.push_str("\nBy category\n");
        output.push_str(&"-".repeat(72));
        output.push('\n');
        output.push_str(&format!(
            "{:<24} {:>16} {:>8} {:>8}\n",
            "Category", "Amount", "Count", "%"
        ));
        for category in &self.categories {
            output.push_str(&format!(
                "{:<24} {:>16} {:>8} {:>8}\n",
                category.category,
                format_amount(category.total, symbol),
                category.count,
                format_percentage(category.percentage)
            ));
        }

        output
    }

    /// Export the per-category breakdown to CSV format
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> SpendResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["category", "amount", "count", "percentage"])
            .map_err(|e| SpendError::Export(e.to_string()))?;

        for category in &self.categories {
            csv.write_record([
                category.category.clone(),
                format!("{:.2}", category.total),
                category.count.to_string(),
                format!("{:.2}", category.percentage),
            ])
            .map_err(|e| SpendError::Export(e.to_string()))?;
        }

        csv.write_record([
            "TOTAL".to_string(),
            format!("{:.2}", self.total_spending),
            self.total_expenses.to_string(),
            "100.00".to_string(),
        ])
        .map_err(|e| SpendError::Export(e.to_string()))?;

        csv.flush().map_err(|e| SpendError::Export(e.to_string()))?;
        Ok(())
    }

    /// Get top spending categories
    pub fn top_categories(&self, limit: usize) -> &[SpendingByCategory] {
        &self.categories[..limit.min(self.categories.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn expenses() -> Vec<Expense> {
        vec![
            Expense::new(50.0, "food", date(1, 10)),
            Expense::new(30.0, "food", date(1, 10)),
            Expense::new(900.0, "rent", date(1, 1)),
            Expense::new(20.0, "transport", date(2, 3)),
            Expense::new(900.0, "rent", date(2, 1)),
        ]
    }

    #[test]
    fn test_summary_figures() {
        let report = SpendingReport::from_expenses(&expenses(), date(2, 15));

        assert_eq!(report.total_this_month, 920.0);
        assert_eq!(report.top_category.as_deref(), Some("rent"));
        assert_eq!(report.total_spending, 1900.0);
        // four active days: 80 + 900 + 20 + 900
        assert_eq!(report.average_per_active_day, 475.0);
        assert_eq!(report.monthly.len(), 2);
        assert_eq!(report.monthly[0].label(), "2025-01");
        assert_eq!(report.monthly[0].total, 980.0);

        let food = report.categories.iter().find(|c| c.category == "food").unwrap();
        assert_eq!(food.count, 2);
        assert!((food.percentage - 80.0 / 1900.0 * 100.0).abs() < 1e-9);
        assert_eq!(report.top_categories(2).len(), 2);
    }

    #[test]
    fn test_empty_report() {
        let report = SpendingReport::from_expenses(&[], date(1, 1));
        assert_eq!(report.top_category, None);
        assert_eq!(report.average_per_active_day, 0.0);
        assert!(report.format_terminal("$").contains("No expenses recorded yet."));
    }

    #[test]
    fn test_export_csv() {
        let report = SpendingReport::from_expenses(&expenses(), date(2, 15));
        let mut buffer = Vec::new();
        report.export_csv(&mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "category,amount,count,percentage");
        assert!(lines[1].starts_with("rent,1800.00,2,"));
        assert_eq!(lines.last().copied(), Some("TOTAL,1900.00,5,100.00"));
    }
}
