//! Feature rows for the daily spending model

use chrono::{Datelike, Weekday};

use crate::models::ExpenseRecord;

/// Number of columns in a [`FeatureRow`]
pub const FEATURE_COUNT: usize = 7;

/// Names of the columns, in [`FeatureRow`] order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "month",
    "day_of_week",
    "is_weekend",
    "lag_7",
    "lag_14",
    "lag_28",
    "rolling_mean_7",
];

const LAGS: [usize; 3] = [7, 14, 28];
const ROLLING_WINDOW: usize = 7;

pub type FeatureRow = [f64; FEATURE_COUNT];

/// Build one feature row per record
///
/// `records` must belong to a single category and be sorted by date. Lags are
/// counted in rows, not days; a lag reaching before the first row is 0. The
/// rolling mean covers the current row and up to six before it.
pub fn build_features(records: &[&ExpenseRecord]) -> Vec<FeatureRow> {
    let amounts: Vec<f64> = records.iter().map(|r| r.amount).collect();

    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let weekday = record.date.weekday();
            let lag = |n: usize| if i >= n { amounts[i - n] } else { 0.0 };
            let window = &amounts[i.saturating_sub(ROLLING_WINDOW - 1)..=i];
            let rolling = window.iter().sum::<f64>() / window.len() as f64;

            [
                f64::from(record.date.month()),
                f64::from(weekday.num_days_from_monday()),
                if matches!(weekday, Weekday::Sat | Weekday::Sun) { 1.0 } else { 0.0 },
                lag(LAGS[0]),
                lag(LAGS[1]),
                lag(LAGS[2]),
                rolling,
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_calendar_columns() {
        // 2025-03-08 is a Saturday
        let saturday = ExpenseRecord::new(10.0, "food", NaiveDate::from_ymd_opt(2025, 3, 8).unwrap());
        let monday = ExpenseRecord::new(20.0, "food", NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        let rows = build_features(&[&saturday, &monday]);

        assert_eq!(rows[0][0], 3.0);
        assert_eq!(rows[0][1], 5.0);
        assert_eq!(rows[0][2], 1.0);
        assert_eq!(rows[1][1], 0.0);
        assert_eq!(rows[1][2], 0.0);
    }

    #[test]
    fn test_lags_and_rolling_mean() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let records: Vec<ExpenseRecord> = (0..10i64)
            .map(|i| ExpenseRecord::new((i + 1) as f64, "food", start + chrono::Duration::days(i)))
            .collect();
        let refs: Vec<&ExpenseRecord> = records.iter().collect();
        let rows = build_features(&refs);

        assert_eq!(rows[0][3], 0.0);
        assert_eq!(rows[0][6], 1.0);
        assert_eq!(rows[7][3], 1.0);
        assert_eq!(rows[9][3], 3.0);
        assert_eq!(rows[9][4], 0.0);
        // rows 3..=9 hold amounts 4..=10
        assert!((rows[9][6] - 7.0).abs() < 1e-12);
    }
}
