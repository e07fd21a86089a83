//! Dashboard Summary
//!
//! Account-wide totals and whole-account health for one snapshot.

use serde::Serialize;

use crate::display::{format_currency, format_percentage};
use crate::models::{Classification, Transaction, ZoneThresholds};
use crate::services::{account_health, summarize, Totals};

/// Dashboard summary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Session owner, if scoped
    pub owner_email: Option<String>,
    /// Income, expense and record counts
    pub totals: Totals,
    /// Expense measured against income
    pub health: Classification,
}

impl DashboardSummary {
    /// Generate the summary for a set of records
    pub fn generate(
        transactions: &[Transaction],
        owner_email: Option<&str>,
        health_thresholds: &ZoneThresholds,
    ) -> Self {
        let totals = summarize(transactions);
        Self {
            owner_email: owner_email.map(str::to_string),
            health: account_health(&totals, health_thresholds),
            totals,
        }
    }

    pub fn balance(&self) -> f64 {
        self.totals.balance()
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, currency: &str) -> String {
        let mut output = String::new();

        output.push_str("Dashboard\n");
        output.push_str(&"=".repeat(50));
        output.push('\n');
        output.push_str(&format!(
            "User: {}\n\n",
            self.owner_email.as_deref().unwrap_or("N/A")
        ));

        output.push_str(&format!(
            "{:<20} {:>20}\n",
            "Total Income:",
            format_currency(currency, self.totals.income)
        ));
        output.push_str(&format!(
            "{:<20} {:>20}\n",
            "Total Expense:",
            format_currency(currency, self.totals.expense)
        ));
        output.push_str(&format!(
            "{:<20} {:>20}\n",
            "Balance:",
            format_currency(currency, self.balance())
        ));
        output.push_str(&"-".repeat(50));
        output.push('\n');
        output.push_str(&format!("Transactions: {}\n", self.totals.record_count));

        if self.totals.flagged_count > 0 {
            output.push_str(&format!(
                "Flagged records: {} (check amount, type and date)\n",
                self.totals.flagged_count
            ));
        }

        output.push_str(&format!(
            "\nAccount health: {} ({} of income spent)\n",
            self.health.zone.label(),
            format_percentage(self.health.ratio_percent)
        ));
        if self.health.missing_reference {
            output.push_str("No income recorded yet.\n");
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetZone, TransactionKind};
    use chrono::NaiveDate;

    fn when() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_generate_dashboard() {
        let txns = vec![
            Transaction::new("1", TransactionKind::Income, 1000.0, "Salary", when()),
            Transaction::new("2", TransactionKind::Expense, 600.0, "Rent", when()),
        ];
        let summary = DashboardSummary::generate(&txns, Some("a@example.com"), &ZoneThresholds::health());

        assert_eq!(summary.balance(), 400.0);
        assert_eq!(summary.health.zone, BudgetZone::Warning);
        assert_eq!(summary.health.ratio_percent, 60.0);

        let text = summary.format_terminal("₹");
        assert!(text.contains("User: a@example.com"));
        assert!(text.contains("₹ 1000.00"));
        assert!(text.contains("Warning Zone"));
        assert!(!text.contains("Flagged"));
    }

    #[test]
    fn test_dashboard_without_income() {
        let mut bad = Transaction::new("2", TransactionKind::Expense, 0.0, "Food", when());
        bad.kind = None;
        bad.issues.push(crate::models::RecordIssue::MissingKind);

        let summary = DashboardSummary::generate(&[bad], None, &ZoneThresholds::health());
        assert_eq!(summary.health.zone, BudgetZone::Safe);

        let text = summary.format_terminal("$");
        assert!(text.contains("User: N/A"));
        assert!(text.contains("Flagged records: 1"));
        assert!(text.contains("No income recorded yet."));
    }
}
