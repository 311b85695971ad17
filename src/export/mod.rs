//! Export module for SpendLens
//!
//! Provides complete data export functionality in multiple formats:
//! - CSV: one row per expense (spreadsheet-compatible, re-importable)
//! - JSON: machine-readable full export
//! - YAML: human-readable full export

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::{export_expenses_csv, EXPENSE_COLUMNS};
pub use json::{export_full_json, import_from_json, FullExport, EXPORT_SCHEMA_VERSION};
pub use yaml::{export_full_yaml, import_from_yaml};
