//! YAML Export functionality
//!
//! Exports all expenses to YAML format for human-readable backup.

use std::io::Write;

use crate::error::{SpendError, SpendResult};
use crate::export::json::FullExport;
use crate::storage::Storage;

/// Export the full database to YAML format
pub fn export_full_yaml<W: Write>(storage: &Storage, writer: &mut W) -> SpendResult<()> {
    let export = FullExport::from_storage(storage)?;
    let to_export_error = |e: std::io::Error| SpendError::Export(e.to_string());

    writeln!(writer, "# SpendLens expense export").map_err(to_export_error)?;
    writeln!(writer, "# Generated: {}", export.exported_at).map_err(to_export_error)?;
    writeln!(writer, "# App Version: {}", export.app_version).map_err(to_export_error)?;
    writeln!(writer).map_err(to_export_error)?;

    serde_yaml::to_writer(writer, &export).map_err(|e| SpendError::Export(e.to_string()))?;

    Ok(())
}

/// Parse and validate a YAML export
pub fn import_from_yaml(yaml_str: &str) -> SpendResult<FullExport> {
    let export: FullExport =
        serde_yaml::from_str(yaml_str).map_err(|e| SpendError::Import(e.to_string()))?;
    export.validate().map_err(SpendError::Import)?;
    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpendPaths;
    use crate::models::Expense;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_export() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        storage
            .expenses
            .upsert(Expense::with_details(1200.0, "rent", "transfer", date, "May"))
            .unwrap();

        let mut output = Vec::new();
        export_full_yaml(&storage, &mut output).unwrap();
        let yaml = String::from_utf8(output).unwrap();

        assert!(yaml.starts_with("# SpendLens expense export"));
        assert!(yaml.contains("category: rent"));

        let export = import_from_yaml(&yaml).unwrap();
        assert_eq!(export.expenses.len(), 1);
        assert_eq!(export.expenses[0].payment_method, "transfer");
    }
}
