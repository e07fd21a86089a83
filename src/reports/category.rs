//! Category Breakdown
//!
//! Expense per category with its share of total spending.

use std::io::Write;

use serde::Serialize;

use crate::display::{format_bar, format_currency, format_percentage, truncate};
use crate::error::{ReportError, ReportResult};
use crate::models::Transaction;
use crate::services::{by_category, UndatedPolicy};

/// Spending in one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub total: f64,
    /// Percentage of total expense
    pub percentage: f64,
}

/// Category breakdown report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    /// Categories, most spending first
    pub categories: Vec<CategoryShare>,
    pub total_expense: f64,
}

impl CategoryBreakdown {
    pub fn generate(transactions: &[Transaction], undated: UndatedPolicy) -> Self {
        let totals = by_category(transactions, undated);
        let total_expense: f64 = totals.values().sum();

        let mut categories: Vec<CategoryShare> = totals
            .into_iter()
            .map(|(category, total)| CategoryShare {
                percentage: if total_expense > 0.0 {
                    total / total_expense * 100.0
                } else {
                    0.0
                },
                category,
                total,
            })
            .collect();

        // Most spending first; names break ties so the order is stable
        categories.sort_by(|a, b| {
            b.total
                .total_cmp(&a.total)
                .then_with(|| a.category.cmp(&b.category))
        });

        Self {
            categories,
            total_expense,
        }
    }

    /// The `limit` categories with the most spending
    pub fn top(&self, limit: usize) -> &[CategoryShare] {
        &self.categories[..limit.min(self.categories.len())]
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, currency: &str) -> String {
        let mut output = String::new();

        output.push_str("Spending by Category\n");
        output.push_str(&"=".repeat(70));
        output.push('\n');

        if self.categories.is_empty() {
            output.push_str("No expenses recorded.\n");
            return output;
        }

        output.push_str(&format!(
            "{:<24} {:>14} {:>7}  {}\n",
            "Category", "Amount", "%", "Share"
        ));
        output.push_str(&"-".repeat(70));
        output.push('\n');

        for share in &self.categories {
            output.push_str(&format!(
                "{:<24} {:>14} {:>7}  {}\n",
                truncate(&share.category, 24),
                format_currency(currency, share.total),
                format_percentage(share.percentage),
                format_bar(share.percentage, 100.0, 20)
            ));
        }

        output.push_str(&"-".repeat(70));
        output.push('\n');
        output.push_str(&format!(
            "{:<24} {:>14}\n",
            "TOTAL",
            format_currency(currency, self.total_expense)
        ));

        output
    }

    /// Export the report to CSV format
    pub fn export_csv<W: Write>(&self, writer: W) -> ReportResult<()> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(["Category", "Amount", "Percentage"])?;
        for share in &self.categories {
            out.write_record([
                share.category.clone(),
                format!("{:.2}", share.total),
                format!("{:.2}", share.percentage),
            ])?;
        }
        out.flush()
            .map_err(|e| ReportError::render("csv", e.to_string()))?;
        Ok(())
    }
}
