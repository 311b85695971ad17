//! CLI commands for reports
//!
//! Spending summary, anomaly alerts, forecasts and budget optimization, each
//! printed to the terminal or exported to CSV.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Subcommand;
use tracing::warn;

use crate::cli::expense::create_output;
use crate::config::Settings;
use crate::error::{SpendError, SpendResult};
use crate::models::{parse_amount, parse_date, SolverStatus};
use crate::optimizer::BudgetBounds;
use crate::reports::{AllocationReport, AnomalyReport, ForecastReport, SpendingReport};
use crate::services::{AnalysisService, BaselineKind, OptimizeRequest};
use crate::storage::Storage;

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Dashboard summary: this month, top category, monthly totals
    #[command(alias = "spending")]
    Summary {
        /// Reference date for "this month" (defaults to today)
        #[arg(long)]
        as_of: Option<String>,

        /// Show top N categories only
        #[arg(long)]
        top: Option<usize>,

        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List unusual expenses per category
    #[command(alias = "alerts")]
    Anomalies {
        /// Days before the latest expense to analyze
        #[arg(short, long)]
        window: Option<u32>,

        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Forecast daily spending per category
    Forecast {
        /// Days to project the daily estimate over
        #[arg(short, long)]
        days: Option<u32>,

        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Suggest a per-category budget within income minus savings
    #[command(alias = "budget")]
    Optimize {
        /// Monthly income (defaults to the configured value)
        #[arg(short, long)]
        income: Option<f64>,

        /// Savings target (defaults to the configured value)
        #[arg(short, long)]
        savings: Option<f64>,

        /// Per-category targets to follow
        #[arg(short, long, default_value = "forecast")]
        baseline: String,

        /// Pin a category to an exact amount (CATEGORY=AMOUNT, repeatable)
        #[arg(long = "fixed", value_parser = parse_category_amount)]
        fixed: Vec<(String, f64)>,

        /// Lower bound for a category (CATEGORY=AMOUNT, repeatable)
        #[arg(long = "min", value_parser = parse_category_amount)]
        min: Vec<(String, f64)>,

        /// Upper bound for a category (CATEGORY=AMOUNT, repeatable)
        #[arg(long = "max", value_parser = parse_category_amount)]
        max: Vec<(String, f64)>,

        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle a report command
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ReportCommands,
) -> SpendResult<()> {
    let service = AnalysisService::new(storage, settings);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        ReportCommands::Summary { as_of, top, output } => {
            let as_of = match as_of {
                Some(d) => parse_date(&d, &settings.date_format)?,
                None => chrono::Local::now().date_naive(),
            };
            let mut report = SpendingReport::generate(storage, as_of)?;
            if let Some(n) = top {
                report.categories.truncate(n);
            }

            match output {
                Some(path) => {
                    write_csv(&path, |w| report.export_csv(w))?;
                    println!("Spending summary exported to: {}", path.display());
                }
                None => println!("{}", report.format_terminal(symbol)),
            }
        }

        ReportCommands::Anomalies { window, output } => {
            let window = window.unwrap_or(settings.anomaly.window_days);
            let report = AnomalyReport::generate(&service, window)?;

            match output {
                Some(path) => {
                    write_csv(&path, |w| report.export_csv(w))?;
                    println!(
                        "{} alert(s) exported to: {}",
                        report.alerts.len(),
                        path.display()
                    );
                }
                None => println!("{}", report.format_terminal(symbol)),
            }
        }

        ReportCommands::Forecast { days, output } => {
            let days = days.unwrap_or(settings.forecast.projection_days);
            if days == 0 {
                return Err(SpendError::Validation(
                    "Projection days must be positive".into(),
                ));
            }
            let report = ForecastReport::generate(&service, days)?;

            match output {
                Some(path) => {
                    write_csv(&path, |w| report.export_csv(w))?;
                    println!("Forecast exported to: {}", path.display());
                }
                None => println!("{}", report.format_terminal(symbol)),
            }
        }

        ReportCommands::Optimize {
            income,
            savings,
            baseline,
            fixed,
            min,
            max,
            output,
        } => {
            let bounds = fixed
                .into_iter()
                .fold(BudgetBounds::new(), |b, (c, v)| b.with_fixed(c, v));
            let bounds = min.into_iter().fold(bounds, |b, (c, v)| b.with_min(c, v));
            let bounds = max.into_iter().fold(bounds, |b, (c, v)| b.with_max(c, v));

            let request = OptimizeRequest {
                monthly_income: income,
                savings_target: savings,
                baseline: baseline.parse::<BaselineKind>()?,
                bounds,
            };
            let report = AllocationReport::generate(&service, &request)?;

            if report.status != SolverStatus::Optimal {
                warn!(status = %report.status, "optimizer did not find an optimal allocation");
                eprintln!(
                    "Warning: no optimal allocation found (status: {}). \
                     Check that the bounds fit within income minus savings.",
                    report.status
                );
            }

            match output {
                Some(path) => {
                    write_csv(&path, |w| report.export_csv(w))?;
                    println!("Allocation exported to: {}", path.display());
                }
                None => println!("{}", report.format_terminal(symbol)),
            }
        }
    }

    Ok(())
}

/// Create `path` and hand a buffered writer to `export`
fn write_csv<F>(path: &Path, export: F) -> SpendResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> SpendResult<()>,
{
    let mut writer = create_output(path)?;
    export(&mut writer)?;
    writer
        .flush()
        .map_err(|e| SpendError::Export(e.to_string()))
}

/// Parse a `CATEGORY=AMOUNT` pair
fn parse_category_amount(input: &str) -> Result<(String, f64), String> {
    let (category, amount) = input
        .split_once('=')
        .ok_or_else(|| format!("expected CATEGORY=AMOUNT, got '{}'", input))?;
    let category = category.trim();
    if category.is_empty() {
        return Err("category name cannot be empty".to_string());
    }
    let amount = parse_amount(amount).map_err(|e| e.to_string())?;
    Ok((category.to_string(), amount))
}
