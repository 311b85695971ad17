//! Expense model
//!
//! `Expense` is the stored entity. `ExpenseRecord` is the identity-free
//! snapshot handed to the analysis code.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::ExpenseId;

/// Payment method recorded when none is given
pub const DEFAULT_PAYMENT_METHOD: &str = "card";

/// The (amount, category, date) view of an expense used by the detector,
/// the forecaster and the reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ExpenseRecord {
    pub fn new(amount: f64, category: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            amount,
            category: category.into(),
            date,
            note: None,
        }
    }

    /// Build a record from raw text fields, failing on a malformed amount or date
    pub fn parse(
        amount: &str,
        category: &str,
        date: &str,
        date_format: &str,
    ) -> Result<Self, ExpenseValidationError> {
        let amount = parse_amount(amount)?;
        let date = parse_date(date, date_format)?;
        let record = Self::new(amount, category.trim(), date);
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        validate_amount(self.amount)?;
        if self.category.trim().is_empty() {
            return Err(ExpenseValidationError::EmptyCategory);
        }
        Ok(())
    }
}

/// A stored expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,

    /// Amount spent (always positive)
    pub amount: f64,

    pub category: String,

    #[serde(default = "default_payment_method")]
    pub payment_method: String,

    pub date: NaiveDate,

    #[serde(default)]
    pub note: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

fn default_payment_method() -> String {
    DEFAULT_PAYMENT_METHOD.to_string()
}

impl Expense {
    /// Create a new expense
    pub fn new(amount: f64, category: impl Into<String>, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            amount,
            category: category.into(),
            payment_method: default_payment_method(),
            date,
            note: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an expense with all user-facing fields
    pub fn with_details(
        amount: f64,
        category: impl Into<String>,
        payment_method: impl Into<String>,
        date: NaiveDate,
        note: impl Into<String>,
    ) -> Self {
        let mut expense = Self::new(amount, category, date);
        expense.payment_method = payment_method.into();
        expense.note = note.into();
        expense
    }

    /// Mark the expense as modified
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        validate_amount(self.amount)?;
        if self.category.trim().is_empty() {
            return Err(ExpenseValidationError::EmptyCategory);
        }
        if self.payment_method.trim().is_empty() {
            return Err(ExpenseValidationError::EmptyPaymentMethod);
        }
        Ok(())
    }

    /// Snapshot for the analysis code
    pub fn to_record(&self) -> ExpenseRecord {
        ExpenseRecord {
            amount: self.amount,
            category: self.category.clone(),
            date: self.date,
            note: if self.note.is_empty() {
                None
            } else {
                Some(self.note.clone())
            },
        }
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {:.2}",
            self.date.format("%Y-%m-%d"),
            self.category,
            self.amount
        )
    }
}

/// Parse an amount such as "12.50" or "$1,200"
pub fn parse_amount(input: &str) -> Result<f64, ExpenseValidationError> {
    let cleaned: String = input
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let amount: f64 = cleaned
        .parse()
        .map_err(|_| ExpenseValidationError::InvalidAmount(input.to_string()))?;
    validate_amount(amount)?;
    Ok(amount)
}

/// Parse a calendar date with the given strftime format
pub fn parse_date(input: &str, format: &str) -> Result<NaiveDate, ExpenseValidationError> {
    NaiveDate::parse_from_str(input.trim(), format)
        .map_err(|_| ExpenseValidationError::InvalidDate {
            value: input.to_string(),
            format: format.to_string(),
        })
}

fn validate_amount(amount: f64) -> Result<(), ExpenseValidationError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ExpenseValidationError::NonPositiveAmount(amount));
    }
    Ok(())
}

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq)]
pub enum ExpenseValidationError {
    InvalidAmount(String),
    NonPositiveAmount(f64),
    InvalidDate { value: String, format: String },
    EmptyCategory,
    EmptyPaymentMethod,
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAmount(value) => write!(f, "Invalid amount: '{}'", value),
            Self::NonPositiveAmount(value) => {
                write!(f, "Amount must be a positive number, got {}", value)
            }
            Self::InvalidDate { value, format } => {
                write!(f, "Invalid date '{}' (expected format {})", value, format)
            }
            Self::EmptyCategory => write!(f, "Category cannot be empty"),
            Self::EmptyPaymentMethod => write!(f, "Payment method cannot be empty"),
        }
    }
}

impl std::error::Error for ExpenseValidationError {}

impl From<ExpenseValidationError> for crate::error::SpendError {
    fn from(err: ExpenseValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
