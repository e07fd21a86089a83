//! CLI commands for reports
//!
//! Provides commands for viewing the dashboard and the category, period,
//! history, budget and zone reports.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Subcommand;

use crate::display::{format_currency, format_percentage, format_zone};
use crate::error::{ReportError, ReportResult};
use crate::models::Granularity;
use crate::reports::{ReportEngine, ZoneScope};

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Show income, expense, balance and account health
    #[command(alias = "dashboard")]
    Summary {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show expense per category
    Categories {
        /// Show top N categories only
        #[arg(long)]
        top: Option<usize>,

        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show income and expense per period
    Periods {
        /// weekly, monthly or yearly
        #[arg(short, long, default_value = "monthly")]
        granularity: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show transactions grouped by day, newest first
    History,

    /// Show every budget limit with its zone
    Budgets,

    /// Show whole-account health
    Health,

    /// Show the zone for a scope key (`account` or `category:<name>`)
    Zone {
        scope: String,
    },
}

/// Handle report commands
pub fn handle_report_command(engine: &ReportEngine, cmd: ReportCommands) -> ReportResult<()> {
    let currency = engine.context().settings.currency_symbol.clone();

    match cmd {
        ReportCommands::Summary { json } => {
            let summary = engine.dashboard();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", summary.format_terminal(&currency));
                for diagnostic in engine.diagnostics() {
                    println!("  {}", diagnostic);
                }
            }
        }
        ReportCommands::Categories { top, output } => {
            let report = engine.category_breakdown();
            if let Some(path) = output {
                let file = File::create(&path).map_err(|e| {
                    ReportError::Io(format!("Failed to create file {}: {}", path.display(), e))
                })?;
                report.export_csv(BufWriter::new(file))?;
                println!("Category report exported to: {}", path.display());
            } else if let Some(n) = top {
                println!("Top {} Spending Categories\n", n);
                for share in report.top(n) {
                    println!(
                        "{:<24} {:>14} {:>7}",
                        share.category,
                        format_currency(&currency, share.total),
                        format_percentage(share.percentage)
                    );
                }
            } else {
                println!("{}", report.format_terminal(&currency));
            }
        }
        ReportCommands::Periods { granularity, json } => {
            let granularity: Granularity = granularity.parse().map_err(|e| {
                ReportError::Validation(format!("{}. Use weekly, monthly or yearly", e))
            })?;
            let report = engine.period_report(granularity);
            if json {
                println!("{}", serde_json::to_string_pretty(&report.buckets)?);
            } else {
                println!("{}", report.format_terminal(&currency));
            }
        }
        ReportCommands::History => {
            let today = chrono::Local::now().date_naive();
            println!("{}", engine.history(today).format_terminal(&currency));
        }
        ReportCommands::Budgets => {
            if engine.context().budgets.is_empty() {
                println!("No budgets loaded. Pass --budgets <file>.");
            }
            println!("{}", engine.budget_status().format_terminal(&currency));
        }
        ReportCommands::Health => {
            let summary = engine.dashboard();
            println!(
                "{} ({} of income spent)",
                format_zone(summary.health.zone),
                format_percentage(summary.health.ratio_percent)
            );
            println!("{}", summary.health.zone.advice());
        }
        ReportCommands::Zone { scope } => {
            let scope: ZoneScope = scope.parse()?;
            let zone = engine.get_zone(&scope);
            println!(
                "{}: {} ({})",
                scope,
                format_zone(zone.zone),
                format_percentage(zone.ratio_percent)
            );
            if let Some(issue) = engine.reference_issue(&scope) {
                println!("{}; defaulted to Safe.", issue);
            }
        }
    }

    Ok(())
}
