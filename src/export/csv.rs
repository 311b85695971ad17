//! CSV Export functionality
//!
//! Writes every stored expense, newest first. The column set is a superset
//! of what the importer requires, so an export can be imported again.

use std::io::Write;

use crate::error::{SpendError, SpendResult};
use crate::storage::Storage;

/// Header row of the expense export
pub const EXPENSE_COLUMNS: [&str; 7] = [
    "id",
    "amount",
    "category",
    "payment_method",
    "date",
    "note",
    "created_at",
];

/// Export all expenses to CSV; returns the number of rows written
pub fn export_expenses_csv<W: Write>(storage: &Storage, writer: &mut W) -> SpendResult<usize> {
    let expenses = storage.expenses.get_all()?;
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record(EXPENSE_COLUMNS)
        .map_err(|e| SpendError::Export(e.to_string()))?;

    for expense in &expenses {
        csv.write_record([
            expense.id.as_uuid().to_string(),
            format!("{:.2}", expense.amount),
            expense.category.clone(),
            expense.payment_method.clone(),
            expense.date.format("%Y-%m-%d").to_string(),
            expense.note.clone(),
            expense.created_at.to_rfc3339(),
        ])
        .map_err(|e| SpendError::Export(e.to_string()))?;
    }

    csv.flush().map_err(|e| SpendError::Export(e.to_string()))?;
    Ok(expenses.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpendPaths;
    use crate::models::Expense;
    use crate::services::ImportService;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_csv_export() {
        let (_temp_dir, storage) = create_test_storage();
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        storage
            .expenses
            .upsert(Expense::with_details(12.5, "food", "cash", date, "tacos, two"))
            .unwrap();

        let mut output = Vec::new();
        assert_eq!(export_expenses_csv(&storage, &mut output).unwrap(), 1);

        let csv_str = String::from_utf8(output).unwrap();
        let mut lines = csv_str.lines();
        assert_eq!(
            lines.next(),
            Some("id,amount,category,payment_method,date,note,created_at")
        );
        let row = lines.next().unwrap();
        assert!(row.contains(",12.50,food,cash,2025-01-15,\"tacos, two\","));
    }

    #[test]
    fn test_export_can_be_imported() {
        let (_temp_dir, source) = create_test_storage();
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        source.expenses.upsert(Expense::new(40.0, "fuel", date)).unwrap();
        source.expenses.upsert(Expense::new(9.0, "coffee", date)).unwrap();

        let mut output = Vec::new();
        export_expenses_csv(&source, &mut output).unwrap();

        let (_other_dir, target) = create_test_storage();
        let result = ImportService::new(&target, "%Y-%m-%d")
            .import_reader(output.as_slice())
            .unwrap();
        assert_eq!(result.imported, 2);
        assert_eq!(target.expenses.categories().unwrap(), vec!["coffee", "fuel"]);
    }
}
