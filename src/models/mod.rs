//! Core data models for SpendLens
//!
//! Expenses as stored, the record snapshot consumed by the analysis code, and
//! the result types produced by the detector and the optimizer.

pub mod alert;
pub mod allocation;
pub mod expense;
pub mod ids;

pub use alert::{compare_alerts, sort_alerts, AnomalyAlert, Severity};
pub use allocation::{BudgetAllocation, SolverStatus};
pub use expense::{
    parse_amount, parse_date, Expense, ExpenseRecord, ExpenseValidationError,
    DEFAULT_PAYMENT_METHOD,
};
pub use ids::ExpenseId;
