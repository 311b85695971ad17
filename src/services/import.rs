//! CSV import service
//!
//! Imports expenses from a CSV file with a header row naming the columns
//! `amount`, `category`, `payment_method`, `date` and optionally `note`, in
//! any order. Header matching ignores case and surrounding whitespace.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{info, warn};

use crate::error::{SpendError, SpendResult};
use crate::models::{parse_amount, parse_date};
use crate::services::expense::{CreateExpenseInput, ExpenseService};
use crate::storage::Storage;

/// Columns every import file must have
pub const REQUIRED_COLUMNS: [&str; 4] = ["amount", "category", "payment_method", "date"];
pub const NOTE_COLUMN: &str = "note";

/// Positions of the known columns in the header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub amount: usize,
    pub category: usize,
    pub payment_method: usize,
    pub date: usize,
    pub note: Option<usize>,
}

impl ColumnMapping {
    /// Locate the columns by name; fails listing every missing required column
    pub fn from_headers(headers: &StringRecord) -> SpendResult<Self> {
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
        };

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| position(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(SpendError::Import(format!(
                "CSV is missing required column(s): {} (expected {}; {} optional)",
                missing.join(", "),
                REQUIRED_COLUMNS.join(", "),
                NOTE_COLUMN
            )));
        }

        Ok(Self {
            amount: position("amount").unwrap_or_default(),
            category: position("category").unwrap_or_default(),
            payment_method: position("payment_method").unwrap_or_default(),
            date: position("date").unwrap_or_default(),
            note: position(NOTE_COLUMN),
        })
    }
}

/// Outcome of an import
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub imported: usize,
    /// Error message per 1-based data row number
    pub errors: BTreeMap<usize, String>,
}

impl ImportResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Service for CSV import
pub struct ImportService<'a> {
    storage: &'a Storage,
    date_format: String,
}

impl<'a> ImportService<'a> {
    pub fn new(storage: &'a Storage, date_format: impl Into<String>) -> Self {
        Self {
            storage,
            date_format: date_format.into(),
        }
    }

    pub fn import_file(&self, path: &Path) -> SpendResult<ImportResult> {
        let file = std::fs::File::open(path).map_err(|e| {
            SpendError::Import(format!("Cannot open '{}': {}", path.display(), e))
        })?;
        self.import_reader(file)
    }

    /// Parse every row, then store the valid ones with a single write
    ///
    /// A missing required column rejects the whole file. Rows that fail to
    /// parse are skipped and reported by row number.
    pub fn import_reader<R: Read>(&self, reader: R) -> SpendResult<ImportResult> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| SpendError::Import(format!("Cannot read CSV header: {}", e)))?
            .clone();
        let mapping = ColumnMapping::from_headers(&headers)?;

        let mut result = ImportResult::default();
        let mut inputs = Vec::new();

        for (idx, record) in reader.records().enumerate() {
            let row_number = idx + 1;
            let parsed = record
                .map_err(|e| format!("Unreadable row: {}", e))
                .and_then(|r| self.parse_record(&r, &mapping));
            match parsed {
                Ok(input) => inputs.push(input),
                Err(message) => {
                    warn!(row = row_number, %message, "skipping CSV row");
                    result.errors.insert(row_number, message);
                }
            }
        }

        if !inputs.is_empty() {
            result.imported = ExpenseService::new(self.storage).create_many(inputs)?.len();
        }

        info!(
            imported = result.imported,
            errors = result.errors.len(),
            "CSV import finished"
        );
        Ok(result)
    }

    fn parse_record(
        &self,
        record: &StringRecord,
        mapping: &ColumnMapping,
    ) -> Result<CreateExpenseInput, String> {
        let field = |idx: usize, name: &str| {
            record
                .get(idx)
                .map(str::trim)
                .ok_or_else(|| format!("Missing {} value", name))
        };

        let amount = parse_amount(field(mapping.amount, "amount")?).map_err(|e| e.to_string())?;
        let date = parse_date(field(mapping.date, "date")?, &self.date_format)
            .map_err(|e| e.to_string())?;

        let category = field(mapping.category, "category")?;
        if category.is_empty() {
            return Err("Category cannot be empty".into());
        }

        let payment_method = field(mapping.payment_method, "payment_method")?;
        let note = mapping
            .note
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        Ok(CreateExpenseInput {
            amount,
            category: category.to_string(),
            payment_method: Some(payment_method.to_string()),
            date,
            note,
        })
    }
}
