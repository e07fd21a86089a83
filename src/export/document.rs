//! Canonical export representation
//!
//! Every output format is rendered from one [`ExportDocument`]: a fixed
//! column list, rows of already-stringified cells, and a summary block.

use std::fmt::Write as _;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::models::transaction::CANONICAL_TIMESTAMP_FORMAT;
use crate::models::{RecordIssue, Transaction};
use crate::services::{parse_amount_text, Totals};

/// A column of the export table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Machine key, used as the CSV header
    pub key: &'static str,
    /// Human-readable heading for documents
    pub heading: &'static str,
}

/// Export columns, in output order
pub const COLUMNS: [Column; 7] = [
    Column { key: "id", heading: "ID" },
    Column { key: "title", heading: "Title" },
    Column { key: "amount", heading: "Amount" },
    Column { key: "category", heading: "Category" },
    Column { key: "kind", heading: "Type" },
    Column { key: "occurredAt", heading: "Date" },
    Column { key: "ownerEmail", heading: "Owner" },
];

/// Position of the amount column
pub const AMOUNT_COLUMN: usize = 2;

/// Position of the kind column
pub const KIND_COLUMN: usize = 4;

/// Presentation options for one export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub title: String,
    /// Session owner; fills rows with no owner and the header block
    pub owner_email: Option<String>,
    pub currency_symbol: String,
    pub timestamp_format: String,
    pub sheet_name: String,
    pub rows_per_page: usize,
}

impl ExportOptions {
    pub fn from_settings(settings: &Settings, owner_email: Option<&str>) -> Self {
        Self {
            title: settings.report_title.clone(),
            owner_email: owner_email
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            currency_symbol: settings.currency_symbol.clone(),
            timestamp_format: settings.timestamp_format.clone(),
            sheet_name: settings.sheet_name.clone(),
            rows_per_page: settings.rows_per_page,
        }
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default(), None)
    }
}

/// Totals shown above the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryBlock {
    pub title: String,
    pub owner_email: Option<String>,
    pub currency_symbol: String,
    pub income: f64,
    pub expense: f64,
}

impl SummaryBlock {
    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }

    /// Header lines shared by the paged and printable formats
    pub fn header_lines(&self, record_count: usize) -> Vec<String> {
        let money = |amount: f64| format!("{} {:.2}", self.currency_symbol, amount);
        vec![
            format!("User: {}", self.owner_email.as_deref().unwrap_or("N/A")),
            format!("Total Income: {}", money(self.income)),
            format!("Total Expense: {}", money(self.expense)),
            format!("Balance: {}", money(self.balance())),
            format!("Records: {}", record_count),
        ]
    }
}

/// Format-agnostic table plus summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportDocument {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
    pub summary: SummaryBlock,
    pub sheet_name: String,
    pub rows_per_page: usize,
}

impl ExportDocument {
    /// Build the document from normalized records and their totals
    ///
    /// All records become rows, flagged ones included. Cells for flagged
    /// fields carry the raw text that failed to parse, or stay empty when
    /// the field was absent.
    pub fn build(transactions: &[Transaction], totals: &Totals, options: &ExportOptions) -> Self {
        let rows = transactions
            .iter()
            .map(|txn| row_for(txn, options))
            .collect();

        Self {
            columns: COLUMNS.to_vec(),
            rows,
            summary: SummaryBlock {
                title: options.title.clone(),
                owner_email: options.owner_email.clone(),
                currency_symbol: options.currency_symbol.clone(),
                income: totals.income,
                expense: totals.expense,
            },
            sheet_name: options.sheet_name.clone(),
            rows_per_page: options.rows_per_page.max(1),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column keys in order
    pub fn keys(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.key).collect()
    }

    /// Column headings in order
    pub fn headings(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.heading).collect()
    }

    /// Summary header lines for this document
    pub fn header_lines(&self) -> Vec<String> {
        self.summary.header_lines(self.row_count())
    }
}

/// Recompute income and expense from stringified rows
///
/// A row contributes when its kind cell is `income` or `expense` and its
/// amount cell parses as a non-negative number. Used to check that a
/// rendered format can be read back to the same totals.
pub fn totals_from_rows<I, R>(rows: I) -> (f64, f64)
where
    I: IntoIterator<Item = R>,
    R: AsRef<[String]>,
{
    let mut income = 0.0;
    let mut expense = 0.0;

    for row in rows {
        let row = row.as_ref();
        let (Some(kind), Some(amount)) = (row.get(KIND_COLUMN), row.get(AMOUNT_COLUMN)) else {
            continue;
        };
        let Some(amount) = parse_amount_text(amount) else {
            continue;
        };
        match kind.as_str() {
            "income" => income += amount,
            "expense" => expense += amount,
            _ => {}
        }
    }

    (income, expense)
}

fn row_for(txn: &Transaction, options: &ExportOptions) -> Vec<String> {
    let amount = match txn.issue_where(|i| {
        matches!(i, RecordIssue::InvalidAmount(_) | RecordIssue::MissingAmount)
    }) {
        Some(issue) => issue.raw().unwrap_or_default().to_string(),
        None => txn.amount.to_string(),
    };

    let kind = match (txn.kind, txn.issue_where(|i| matches!(i, RecordIssue::InvalidKind(_)))) {
        (_, Some(issue)) => issue.raw().unwrap_or_default().to_string(),
        (Some(kind), None) => kind.as_str().to_string(),
        (None, None) => String::new(),
    };

    let occurred_at = match (txn.occurred_at, txn.issue_where(RecordIssue::is_temporal)) {
        (Some(at), _) => format_timestamp(at, &options.timestamp_format),
        (None, Some(issue)) => issue.raw().unwrap_or_default().to_string(),
        (None, None) => String::new(),
    };

    let owner = if txn.owner_email.is_empty() {
        options.owner_email.clone().unwrap_or_default()
    } else {
        txn.owner_email.clone()
    };

    vec![
        txn.id.clone(),
        txn.title.clone(),
        amount,
        txn.category.clone(),
        kind,
        occurred_at,
        owner,
    ]
}

/// Format a timestamp, falling back to the canonical format if the
/// configured one cannot be rendered
fn format_timestamp(at: NaiveDateTime, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", at.format(format)).is_err() {
        out.clear();
        out.push_str(&at.format(CANONICAL_TIMESTAMP_FORMAT).to_string());
    }
    out
}
