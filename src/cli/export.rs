//! CLI commands for data export
//!
//! Provides the `export` command, writing one format or all four.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use tracing::warn;

use crate::error::{ReportError, ReportResult};
use crate::export::{ExportFormat, ExportPayload};
use crate::reports::ReportEngine;

/// Export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    /// CSV text
    Csv,
    /// XLSX workbook
    Spreadsheet,
    /// Paginated plain-text document
    Document,
    /// HTML for printing
    Printable,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Spreadsheet => ExportFormat::Spreadsheet,
            FormatArg::Document => ExportFormat::Document,
            FormatArg::Printable => ExportFormat::Printable,
        }
    }
}

/// Arguments of the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export format
    #[arg(short, long, value_enum, default_value = "csv")]
    pub format: FormatArg,

    /// Output file path (defaults to the format's file name)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write every format into this directory instead
    #[arg(long, conflicts_with_all = ["format", "output"])]
    pub all: Option<PathBuf>,
}

/// Handle the export command
pub fn handle_export_command(engine: &ReportEngine, args: ExportArgs) -> ReportResult<()> {
    if let Some(dir) = args.all {
        return export_all(engine, &dir);
    }

    let format = ExportFormat::from(args.format);
    let payload = engine.export_as(format)?;
    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(payload.file_name.clone()));
    write_payload(&payload, &path)?;
    println!("Exported {} to: {}", format, path.display());
    Ok(())
}

fn export_all(engine: &ReportEngine, dir: &Path) -> ReportResult<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        ReportError::Io(format!("Failed to create directory {}: {}", dir.display(), e))
    })?;

    let mut failed = Vec::new();
    for (format, result) in engine.export_all() {
        match result {
            Ok(payload) => {
                let path = dir.join(&payload.file_name);
                write_payload(&payload, &path)?;
                println!("Exported {} to: {}", format, path.display());
            }
            Err(e) => {
                warn!(%format, error = %e, "export format failed");
                eprintln!("Failed to export {}: {}", format, e);
                failed.push(format.as_str());
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(ReportError::Validation(format!(
            "{} format(s) failed: {}",
            failed.len(),
            failed.join(", ")
        )))
    }
}

fn write_payload(payload: &ExportPayload, path: &Path) -> ReportResult<()> {
    std::fs::write(path, &payload.bytes).map_err(|e| {
        ReportError::Io(format!("Failed to write {}: {}", path.display(), e))
    })
}
