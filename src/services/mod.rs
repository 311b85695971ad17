//! Service layer for SpendLens
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation, filtering and the hand-off to the analysis code.

pub mod analysis;
pub mod expense;
pub mod import;

pub use analysis::{AnalysisService, BaselineKind, OptimizeOutcome, OptimizeRequest};
pub use expense::{CreateExpenseInput, ExpenseFilter, ExpenseService, UpdateExpenseInput};
pub use import::{ColumnMapping, ImportResult, ImportService};
