//! Anomaly alert model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// How anomalous a flagged expense is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Label used in output and as the alert sort key
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flagged expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyAlert {
    pub category: String,
    pub date: NaiveDate,
    pub amount: f64,
    #[serde(rename = "level")]
    pub severity: Severity,
}

impl AnomalyAlert {
    pub fn new(category: impl Into<String>, date: NaiveDate, amount: f64, severity: Severity) -> Self {
        Self {
            category: category.into(),
            date,
            amount,
            severity,
        }
    }
}

/// Alert ordering: severity label ascending (lexical, so `high` < `low` <
/// `medium`), then amount descending
pub fn compare_alerts(a: &AnomalyAlert, b: &AnomalyAlert) -> Ordering {
    a.severity
        .as_str()
        .cmp(b.severity.as_str())
        .then_with(|| b.amount.total_cmp(&a.amount))
}

/// Sort alerts in place with [`compare_alerts`]; ties keep their input order
pub fn sort_alerts(alerts: &mut [AnomalyAlert]) {
    alerts.sort_by(compare_alerts);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(severity: Severity, amount: f64) -> AnomalyAlert {
        AnomalyAlert::new("food", NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), amount, severity)
    }

    #[test]
    fn test_sort_is_lexical_on_label_then_amount_desc() {
        let mut alerts = vec![
            alert(Severity::Medium, 10.0),
            alert(Severity::Low, 5.0),
            alert(Severity::High, 100.0),
            alert(Severity::Medium, 30.0),
            alert(Severity::High, 300.0),
            alert(Severity::Low, 50.0),
        ];
        sort_alerts(&mut alerts);

        let got: Vec<(&str, f64)> = alerts
            .iter()
            .map(|a| (a.severity.as_str(), a.amount))
            .collect();
        assert_eq!(
            got,
            vec![
                ("high", 300.0),
                ("high", 100.0),
                ("low", 50.0),
                ("low", 5.0),
                ("medium", 30.0),
                ("medium", 10.0),
            ]
        );
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(alert(Severity::High, 12.0)).unwrap();
        assert_eq!(json["level"], "high");
        assert_eq!(json["date"], "2025-01-01");
        assert_eq!(json["category"], "food");
    }
}
