use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use expense_report::cli::{
    handle_export_command, handle_report_command, handle_watch_command, load_budgets,
    load_raw_transactions, ExportArgs, ReportCommands, WatchArgs,
};
use expense_report::config::{ReportPaths, Settings};
use expense_report::reports::{ReportEngine, SessionContext};

#[derive(Parser)]
#[command(
    name = "expense-report",
    version,
    about = "Transaction aggregation and reporting for personal expense tracking",
    long_about = "expense-report reads raw transaction records, normalizes them, and \
                  produces category and period summaries, budget-zone classifications \
                  and exports in CSV, spreadsheet, paged document and printable HTML form."
)]
struct Cli {
    /// Settings file (defaults to config.json in the config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Owner email the session is scoped to
    #[arg(long, global = true, env = "EXPENSE_REPORT_OWNER")]
    owner: Option<String>,

    /// Raw transactions JSON file
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Budget limits JSON file (array of {category, limitAmount})
    #[arg(long, global = true)]
    budgets: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Report(ReportCommands),

    /// Export the transactions in one or all formats
    Export(ExportArgs),

    /// Keep refreshing from the input file and print the dashboard
    Watch(WatchArgs),

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = ReportPaths::new()?;
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load_or_create(&paths)?,
    };

    if let Commands::Config = cli.command {
        println!("Config directory: {}", paths.base_dir().display());
        println!("Settings file:    {}", paths.settings_file().display());
        println!();
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    let budgets = load_budgets(cli.budgets.as_deref())?;
    let context = SessionContext::new(cli.owner.clone(), settings).with_budgets(budgets);

    match cli.command {
        Commands::Watch(args) => {
            let input = cli
                .input
                .context("No input file given. Pass --input <file>")?;
            handle_watch_command(context, input, args)?;
        }
        Commands::Report(cmd) => {
            let raw = load_raw_transactions(cli.input.as_deref())?;
            let engine = ReportEngine::new(context, &raw);
            handle_report_command(&engine, cmd)?;
        }
        Commands::Export(args) => {
            let raw = load_raw_transactions(cli.input.as_deref())?;
            let engine = ReportEngine::new(context, &raw);
            handle_export_command(&engine, args)?;
        }
        Commands::Config => {}
    }

    Ok(())
}
