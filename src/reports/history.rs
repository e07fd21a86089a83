//! Transaction History
//!
//! Records grouped by calendar day, newest day first. The two most recent
//! days are labelled "Today" and "Yesterday" relative to a caller-supplied
//! date; undated records are collected in a final "Undated" group.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::display::{format_currency, truncate};
use crate::models::{Transaction, TransactionKind};

/// Label of the group holding records without a usable date
pub const UNDATED_LABEL: &str = "Undated";

/// Records that fall on one day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGroup {
    /// `None` for the undated group
    pub date: Option<NaiveDate>,
    pub label: String,
    /// In input order
    pub transactions: Vec<Transaction>,
}

/// Day-grouped history report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionHistory {
    pub days: Vec<DayGroup>,
}

impl TransactionHistory {
    /// Group every record by day, flagged ones included
    pub fn generate(transactions: &[Transaction], today: NaiveDate) -> Self {
        let mut by_day: BTreeMap<NaiveDate, Vec<Transaction>> = BTreeMap::new();
        let mut undated = Vec::new();

        for txn in transactions {
            match txn.occurred_at {
                Some(at) => by_day.entry(at.date()).or_default().push(txn.clone()),
                None => undated.push(txn.clone()),
            }
        }

        let mut days: Vec<DayGroup> = by_day
            .into_iter()
            .rev()
            .map(|(date, transactions)| DayGroup {
                date: Some(date),
                label: day_label(date, today),
                transactions,
            })
            .collect();

        if !undated.is_empty() {
            days.push(DayGroup {
                date: None,
                label: UNDATED_LABEL.to_string(),
                transactions: undated,
            });
        }

        Self { days }
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, currency: &str) -> String {
        let mut output = String::new();

        output.push_str("Transaction History\n");
        output.push_str(&"=".repeat(60));
        output.push('\n');

        if self.is_empty() {
            output.push_str("No transactions found\n");
            return output;
        }

        for day in &self.days {
            output.push('\n');
            output.push_str(&day.label);
            output.push('\n');
            output.push_str(&"-".repeat(60));
            output.push('\n');

            for txn in &day.transactions {
                let title = if txn.title.is_empty() {
                    "No description"
                } else {
                    txn.title.as_str()
                };
                let sign = match txn.kind {
                    Some(TransactionKind::Income) => "+",
                    Some(TransactionKind::Expense) => "-",
                    None => "?",
                };
                output.push_str(&format!(
                    "{:<18} {:<24} {} {:>14}\n",
                    truncate(&txn.category, 18),
                    truncate(title, 24),
                    sign,
                    format_currency(currency, txn.amount)
                ));
            }
        }

        output
    }
}

/// "Today", "Yesterday", or the date spelled out, e.g. "05 January 2024"
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if today.pred_opt() == Some(date) {
        "Yesterday".to_string()
    } else {
        date.format("%d %B %Y").to_string()
    }
}
