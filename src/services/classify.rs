//! Zone classification
//!
//! One classifier serves both modes: budget-relative (spend against a
//! category limit) and whole-account health (expense against income). The
//! modes differ only in the thresholds they are given.

use serde::{Deserialize, Serialize};

use crate::models::{BudgetLimit, BudgetZone, Classification, Transaction, ZoneThresholds};

use super::aggregate::{by_category, Totals, UndatedPolicy};

/// Classify a spend against a reference value
///
/// Total over all inputs: a zero, negative or non-finite reference yields a
/// ratio of 0 and the Safe zone. The ratio is capped at 100.
pub fn classify(spend: f64, reference: f64, thresholds: &ZoneThresholds) -> Classification {
    if !(reference.is_finite() && reference > 0.0) {
        return Classification::unreferenced();
    }

    let ratio = spend / reference * 100.0;
    let ratio_percent = if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 100.0)
    };

    let zone = if ratio_percent >= thresholds.danger {
        BudgetZone::Danger
    } else if ratio_percent >= thresholds.warning {
        BudgetZone::Warning
    } else {
        BudgetZone::Safe
    };

    Classification {
        zone,
        ratio_percent,
        missing_reference: false,
    }
}

/// Budget limit joined with the spend in its category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub category: String,
    pub limit_amount: f64,
    pub spent: f64,
    pub classification: Classification,
}

/// Classify every budget limit against the spend in its category
///
/// Limits are returned in input order. Categories without spend have a
/// spent amount of zero here, since the limit itself names them.
pub fn classify_budgets(
    transactions: &[Transaction],
    budgets: &[BudgetLimit],
    thresholds: &ZoneThresholds,
    undated: UndatedPolicy,
) -> Vec<BudgetStatus> {
    let spent_by_category = by_category(transactions, undated);

    budgets
        .iter()
        .map(|budget| {
            let spent = spent_by_category
                .get(&budget.category)
                .copied()
                .unwrap_or(0.0);
            BudgetStatus {
                category: budget.category.clone(),
                limit_amount: budget.limit_amount,
                spent,
                classification: classify(spent, budget.limit_amount, thresholds),
            }
        })
        .collect()
}

/// Whole-account health: expense measured against income
pub fn account_health(totals: &Totals, thresholds: &ZoneThresholds) -> Classification {
    classify(totals.expense, totals.income, thresholds)
}
