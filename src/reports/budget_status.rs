//! Budget Status Report
//!
//! Each budget limit joined with the spend in its category, its zone and
//! an advice line for the user.

use serde::Serialize;

use crate::display::{format_bar, format_currency, format_percentage, format_zone, truncate};
use crate::models::{BudgetLimit, BudgetZone, Transaction, ZoneThresholds};
use crate::services::{classify_budgets, BudgetStatus, UndatedPolicy};

/// Budget status report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatusReport {
    /// One row per budget limit, in the order the limits were given
    pub rows: Vec<BudgetStatus>,
}

impl BudgetStatusReport {
    pub fn generate(
        transactions: &[Transaction],
        budgets: &[BudgetLimit],
        thresholds: &ZoneThresholds,
        undated: UndatedPolicy,
    ) -> Self {
        Self {
            rows: classify_budgets(transactions, budgets, thresholds, undated),
        }
    }

    /// Rows in the given zone
    pub fn in_zone(&self, zone: BudgetZone) -> Vec<&BudgetStatus> {
        self.rows
            .iter()
            .filter(|row| row.classification.zone == zone)
            .collect()
    }

    /// Worst zone across all budgets; Safe when there are none
    pub fn worst_zone(&self) -> BudgetZone {
        self.rows
            .iter()
            .map(|row| row.classification.zone)
            .max()
            .unwrap_or(BudgetZone::Safe)
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, currency: &str) -> String {
        let mut output = String::new();

        output.push_str("Budget Status\n");
        output.push_str(&"=".repeat(90));
        output.push('\n');

        if self.rows.is_empty() {
            output.push_str("No budgets configured.\n");
            return output;
        }

        output.push_str(&format!(
            "{:<20} {:>14} {:>14} {:>6}  {:<12} {}\n",
            "Category", "Spent", "Limit", "Used", "", "Zone"
        ));
        output.push_str(&"-".repeat(90));
        output.push('\n');

        for row in &self.rows {
            let zone = &row.classification;
            output.push_str(&format!(
                "{:<20} {:>14} {:>14} {:>6}  {:<12} {}\n",
                truncate(&row.category, 20),
                format_currency(currency, row.spent),
                format_currency(currency, row.limit_amount),
                format_percentage(zone.ratio_percent),
                format_bar(zone.ratio_percent, 100.0, 12),
                format_zone(zone.zone)
            ));
            if zone.missing_reference {
                output.push_str("    No limit set for this category.\n");
            } else {
                output.push_str(&format!("    {}\n", zone.zone.advice()));
            }
        }

        let over = self.in_zone(BudgetZone::Danger).len();
        if over > 0 {
            output.push_str(&"-".repeat(90));
            output.push('\n');
            output.push_str(&format!("{} budget(s) in the Red Zone\n", over));
        }

        output
    }
}
