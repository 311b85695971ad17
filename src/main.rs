use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use spendlens::cli::{handle_expense_command, handle_report_command};
use spendlens::config::{SpendPaths, Settings};
use spendlens::storage::Storage;

/// Environment variable holding the log filter, e.g. `spendlens=debug`
const LOG_ENV: &str = "SPENDLENS_LOG";

#[derive(Parser)]
#[command(
    name = "spendlens",
    author = "Kaylee Beyene",
    version,
    about = "Terminal-based personal expense tracker",
    long_about = "SpendLens records your expenses and looks at them for you: it \
                  flags unusual spending per category, forecasts what each \
                  category will cost next month and suggests a budget that fits \
                  your income after savings."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and default settings
    Init,

    /// Show current configuration and paths
    Config,

    /// Expense management commands
    #[command(subcommand, alias = "exp")]
    Expense(spendlens::cli::ExpenseCommands),

    /// Summary, anomaly, forecast and budget reports
    #[command(subcommand)]
    Report(spendlens::cli::ReportCommands),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    // Initialize paths and settings
    let paths = SpendPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    settings.validate()?;

    // Initialize storage
    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Init) => {
            println!("Initializing SpendLens at: {}", paths.base_dir().display());
            let created = storage.initialize()?;
            settings.save(&paths)?;
            if created {
                println!("Initialization complete!");
            } else {
                println!("Already initialized, existing expenses were kept.");
            }
            println!();
            println!("Run 'spendlens expense add <AMOUNT> <CATEGORY>' to record an expense,");
            println!("or 'spendlens expense import <FILE>' to load a CSV.");
        }
        Some(Commands::Config) => {
            println!("SpendLens Configuration");
            println!("=======================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Settings file:  {}", paths.settings_file().display());
            println!("Expenses file:  {}", paths.expenses_file().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol:     {}", settings.currency_symbol);
            println!("  Date format:         {}", settings.date_format);
            println!("  Anomaly window:      {} days", settings.anomaly.window_days);
            println!("  Contamination:       {}", settings.anomaly.contamination);
            println!(
                "  Projection:          {} days",
                settings.forecast.projection_days
            );
            println!("  Monthly income:      {:.2}", settings.budget.monthly_income);
            println!("  Savings target:      {:.2}", settings.budget.savings_target);
        }
        Some(Commands::Expense(cmd)) => {
            handle_expense_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Report(cmd)) => {
            handle_report_command(&storage, &settings, cmd)?;
        }
        None => {
            println!("SpendLens - Terminal-based personal expense tracker");
            println!();
            println!("Run 'spendlens --help' for usage information.");
        }
    }

    Ok(())
}
