//! Export module for the reporting engine
//!
//! Provides report export in four formats, all rendered from one
//! [`ExportDocument`]:
//! - CSV: RFC 4180 text
//! - Spreadsheet: XLSX workbook with one named sheet
//! - Document: paginated plain text with a summary block
//! - Printable: HTML for a browser print dialog

pub mod csv;
pub mod document;
pub mod html;
pub mod paged;
pub mod xlsx;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, ReportResult};

pub use self::csv::{render_csv, write_csv};
pub use document::{totals_from_rows, Column, ExportDocument, ExportOptions, SummaryBlock, COLUMNS};
pub use html::{escape_html, render_html};
pub use paged::{render_paged, PAGE_BREAK};
pub use xlsx::render_xlsx;

/// Output format for an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Spreadsheet,
    Document,
    Printable,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [Self::Csv, Self::Spreadsheet, Self::Document, Self::Printable];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Spreadsheet => "spreadsheet",
            Self::Document => "document",
            Self::Printable => "printable",
        }
    }

    /// Default file name for a download of this format
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Csv => "transactions.csv",
            Self::Spreadsheet => "transactions.xlsx",
            Self::Document => "transactions_report.txt",
            Self::Printable => "transactions_summary.html",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            Self::Document => "text/plain; charset=utf-8",
            Self::Printable => "text/html; charset=utf-8",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "spreadsheet" | "xlsx" => Ok(Self::Spreadsheet),
            "document" | "pdf" | "txt" => Ok(Self::Document),
            "printable" | "print" | "html" => Ok(Self::Printable),
            other => Err(ReportError::Validation(format!(
                "Unknown export format '{}'. Use csv, spreadsheet, document or printable",
                other
            ))),
        }
    }
}

/// A rendered export, ready to be written or offered as a download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub format: ExportFormat,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ExportPayload {
    fn new(format: ExportFormat, bytes: Vec<u8>) -> Self {
        Self {
            format,
            file_name: format.file_name().to_string(),
            mime_type: format.mime_type().to_string(),
            bytes,
        }
    }
}

/// Render one format
pub fn render(doc: &ExportDocument, format: ExportFormat) -> ReportResult<ExportPayload> {
    let bytes = match format {
        ExportFormat::Csv => render_csv(doc)?,
        ExportFormat::Spreadsheet => render_xlsx(doc)?,
        ExportFormat::Document => render_paged(doc).into_bytes(),
        ExportFormat::Printable => render_html(doc).into_bytes(),
    };
    Ok(ExportPayload::new(format, bytes))
}

/// Render every format independently
///
/// A failure in one format is reported in its slot and does not stop the
/// others from rendering.
pub fn render_all(doc: &ExportDocument) -> Vec<(ExportFormat, ReportResult<ExportPayload>)> {
    ExportFormat::ALL
        .iter()
        .map(|&format| (format, render(doc, format)))
        .collect()
}
