//! Period Report
//!
//! Income against expense per calendar period.

use serde::Serialize;

use crate::display::format_currency;
use crate::models::{Granularity, PeriodBucket, Transaction};
use crate::services::by_period;

/// Period report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReport {
    pub granularity: Granularity,
    /// Buckets in ascending period order
    pub buckets: Vec<PeriodBucket>,
}

impl PeriodReport {
    pub fn generate(transactions: &[Transaction], granularity: Granularity) -> Self {
        Self {
            granularity,
            buckets: by_period(transactions, granularity),
        }
    }

    pub fn total_income(&self) -> f64 {
        self.buckets.iter().map(|b| b.income_total).sum()
    }

    pub fn total_expense(&self) -> f64 {
        self.buckets.iter().map(|b| b.expense_total).sum()
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, currency: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!("Income vs Expense ({})\n", self.granularity));
        output.push_str(&"=".repeat(72));
        output.push('\n');

        if self.buckets.is_empty() {
            output.push_str("No dated transactions.\n");
            return output;
        }

        output.push_str(&format!(
            "{:<10} {:>16} {:>16} {:>16} {:>8}\n",
            "Period", "Income", "Expense", "Balance", "Count"
        ));
        output.push_str(&"-".repeat(72));
        output.push('\n');

        for bucket in &self.buckets {
            output.push_str(&format!(
                "{:<10} {:>16} {:>16} {:>16} {:>8}\n",
                bucket.period,
                format_currency(currency, bucket.income_total),
                format_currency(currency, bucket.expense_total),
                format_currency(currency, bucket.balance()),
                bucket.transaction_count
            ));
        }

        output.push_str(&"-".repeat(72));
        output.push('\n');
        output.push_str(&format!(
            "{:<10} {:>16} {:>16} {:>16}\n",
            "TOTAL",
            format_currency(currency, self.total_income()),
            format_currency(currency, self.total_expense()),
            format_currency(currency, self.total_income() - self.total_expense())
        ));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionKind;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_yearly_report() {
        let txns = vec![
            Transaction::new("1", TransactionKind::Income, 100.0, "Salary", at(2023, 12, 31)),
            Transaction::new("2", TransactionKind::Expense, 40.0, "Food", at(2024, 1, 1)),
            Transaction::new("3", TransactionKind::Income, 60.0, "Salary", at(2024, 6, 1)),
        ];
        let report = PeriodReport::generate(&txns, Granularity::Yearly);

        let labels: Vec<&str> = report.buckets.iter().map(|b| b.period.as_str()).collect();
        assert_eq!(labels, vec!["2023", "2024"]);
        assert_eq!(report.total_income(), 160.0);
        assert_eq!(report.total_expense(), 40.0);

        let text = report.format_terminal("₹");
        assert!(text.contains("Income vs Expense (yearly)"));
        assert!(text.contains("₹ 120.00"));
    }

    #[test]
    fn test_empty_report() {
        let report = PeriodReport::generate(&[], Granularity::Monthly);
        assert!(report.format_terminal("₹").contains("No dated transactions."));
    }
}
