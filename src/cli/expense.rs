//! Expense CLI commands
//!
//! Implements CLI commands for expense management, CSV import and export.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};

use crate::config::Settings;
use crate::display::{format_expense_details, format_expense_list};
use crate::error::{SpendError, SpendResult};
use crate::export::{export_expenses_csv, export_full_json, export_full_yaml};
use crate::models::{parse_amount, parse_date};
use crate::services::{
    CreateExpenseInput, ExpenseFilter, ExpenseService, ImportService, UpdateExpenseInput,
};
use crate::storage::Storage;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// One row per expense
    Csv,
    /// Full export with metadata
    Json,
    /// Full export with metadata, human-readable
    Yaml,
}

/// Expense subcommands
#[derive(Subcommand, Debug)]
pub enum ExpenseCommands {
    /// Record a new expense
    Add {
        /// Amount spent (e.g. "12.50")
        amount: String,
        /// Category label
        category: String,
        /// Payment method (defaults to "card")
        #[arg(short, long)]
        method: Option<String>,
        /// Expense date, defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Free-form note
        #[arg(short, long)]
        note: Option<String>,
    },
    /// List expenses, newest first
    List {
        /// Filter by category (repeatable)
        #[arg(short = 'c', long = "category")]
        categories: Vec<String>,
        /// Filter by payment method (repeatable)
        #[arg(short = 'm', long = "method")]
        methods: Vec<String>,
        /// Start date
        #[arg(long)]
        from: Option<String>,
        /// End date
        #[arg(long)]
        to: Option<String>,
        /// Minimum amount
        #[arg(long)]
        min: Option<f64>,
        /// Maximum amount (ignored unless positive)
        #[arg(long)]
        max: Option<f64>,
        /// Number of expenses to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },
    /// Show expense details
    Show {
        /// Expense ID or unique prefix
        id: String,
    },
    /// Edit an expense
    Edit {
        /// Expense ID or unique prefix
        id: String,
        #[arg(short, long)]
        amount: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        method: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Delete one or more expenses
    Delete {
        /// Expense IDs or unique prefixes
        #[arg(required = true)]
        ids: Vec<String>,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Import expenses from CSV (amount,category,payment_method,date[,note])
    Import {
        /// Path to CSV file
        file: PathBuf,
    },
    /// Export all expenses
    Export {
        /// Output file path
        output: PathBuf,
        /// Export format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: ExportFormat,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

/// Handle an expense command
pub fn handle_expense_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ExpenseCommands,
) -> SpendResult<()> {
    let service = ExpenseService::new(storage);
    let symbol = settings.currency_symbol.as_str();
    let date_format = settings.date_format.as_str();

    match cmd {
        ExpenseCommands::Add {
            amount,
            category,
            method,
            date,
            note,
        } => {
            let date = match date {
                Some(d) => parse_date(&d, date_format)?,
                None => chrono::Local::now().date_naive(),
            };
            let expense = service.create(CreateExpenseInput {
                amount: parse_amount(&amount)?,
                category,
                payment_method: method,
                date,
                note,
            })?;

            println!("Created expense:");
            print!("{}", format_expense_details(&expense, symbol));
        }

        ExpenseCommands::List {
            categories,
            methods,
            from,
            to,
            min,
            max,
            limit,
        } => {
            let filter = ExpenseFilter {
                start_date: parse_optional_date(from, date_format)?,
                end_date: parse_optional_date(to, date_format)?,
                categories,
                payment_methods: methods,
                min_amount: min,
                max_amount: max,
                limit: Some(limit),
            };
            let expenses = service.list(&filter)?;
            print!("{}", format_expense_list(&expenses, symbol));
        }

        ExpenseCommands::Show { id } => {
            let expense = service.find(&id)?;
            print!("{}", format_expense_details(&expense, symbol));
        }

        ExpenseCommands::Edit {
            id,
            amount,
            category,
            method,
            date,
            note,
        } => {
            let expense = service.find(&id)?;
            let input = UpdateExpenseInput {
                amount: amount.as_deref().map(parse_amount).transpose()?,
                category,
                payment_method: method,
                date: parse_optional_date(date, date_format)?,
                note,
            };
            if input.is_empty() {
                println!("Nothing to change. Pass at least one field to edit.");
                return Ok(());
            }

            let updated = service.update(expense.id, input)?;
            println!("Updated expense:");
            print!("{}", format_expense_details(&updated, symbol));
        }

        ExpenseCommands::Delete { ids, force } => {
            let expenses = ids
                .iter()
                .map(|id| service.find(id))
                .collect::<SpendResult<Vec<_>>>()?;

            if !force {
                println!("About to delete {} expense(s):", expenses.len());
                print!("{}", format_expense_list(&expenses, symbol));
                println!();
                println!("Use --force to confirm deletion");
                return Ok(());
            }

            let ids: Vec<_> = expenses.iter().map(|e| e.id).collect();
            let removed = service.delete_many(&ids)?;
            println!("Deleted {} expense(s)", removed);
        }

        ExpenseCommands::Import { file } => {
            let result = ImportService::new(storage, date_format).import_file(&file)?;
            println!(
                "Imported {} expense(s) from {}",
                result.imported,
                file.display()
            );
            if result.has_errors() {
                println!("Skipped {} row(s):", result.errors.len());
                for (row, message) in &result.errors {
                    println!("  row {}: {}", row, message);
                }
            }
        }

        ExpenseCommands::Export {
            output,
            format,
            pretty,
        } => {
            let mut writer = create_output(&output)?;
            match format {
                ExportFormat::Csv => {
                    let count = export_expenses_csv(storage, &mut writer)?;
                    println!("Exported {} expense(s) to: {}", count, output.display());
                }
                ExportFormat::Json => {
                    export_full_json(storage, &mut writer, pretty)?;
                    println!("Full export written to: {}", output.display());
                }
                ExportFormat::Yaml => {
                    export_full_yaml(storage, &mut writer)?;
                    println!("Full export written to: {}", output.display());
                }
            }
            writer
                .flush()
                .map_err(|e| SpendError::Export(e.to_string()))?;
        }
    }

    Ok(())
}

fn parse_optional_date(value: Option<String>, format: &str) -> SpendResult<Option<NaiveDate>> {
    value
        .map(|v| parse_date(&v, format).map_err(SpendError::from))
        .transpose()
}

/// Open `path` for writing
pub(crate) fn create_output(path: &Path) -> SpendResult<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        SpendError::Export(format!("Failed to create file {}: {}", path.display(), e))
    })?;
    Ok(BufWriter::new(file))
}
