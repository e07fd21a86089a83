//! Aggregation of normalized transactions
//!
//! Pure grouping functions. Every call recomputes its result from scratch;
//! nothing is patched incrementally. Amounts are summed as plain `f64`
//! without rounding, which is left to the formatting layer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Granularity, PeriodBucket, Transaction, TransactionKind};

/// Whether records without a usable timestamp count in category totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UndatedPolicy {
    /// Undated records contribute to category totals
    #[default]
    Include,
    /// Undated records are left out of category totals
    Exclude,
}

impl UndatedPolicy {
    pub fn from_flag(include: bool) -> Self {
        if include {
            Self::Include
        } else {
            Self::Exclude
        }
    }
}

/// Account-wide totals
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
    /// All records, including flagged ones
    pub record_count: usize,
    /// Records that contributed to income or expense
    pub counted_count: usize,
    /// Records with at least one normalization issue
    pub flagged_count: usize,
}

impl Totals {
    /// Income minus expense
    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }
}

/// Expense total per category
///
/// Only records that count toward totals and are expenses are included.
/// Categories with no such records are absent rather than zero.
pub fn by_category(transactions: &[Transaction], undated: UndatedPolicy) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();

    for txn in transactions.iter().filter(|t| t.is_expense()) {
        if undated == UndatedPolicy::Exclude && !txn.is_dated() {
            continue;
        }
        *totals.entry(txn.category.clone()).or_insert(0.0) += txn.amount;
    }

    totals
}

/// Income and expense per period, sorted ascending by label
///
/// Records without a usable timestamp are left out entirely; every other
/// counted record lands in exactly one bucket.
pub fn by_period(transactions: &[Transaction], granularity: Granularity) -> Vec<PeriodBucket> {
    let mut buckets: BTreeMap<String, PeriodBucket> = BTreeMap::new();

    for txn in transactions.iter().filter(|t| t.counts_toward_totals()) {
        let (Some(at), Some(kind)) = (txn.occurred_at, txn.kind) else {
            continue;
        };
        let label = granularity.label_for(at);
        let bucket = buckets
            .entry(label.clone())
            .or_insert_with(|| PeriodBucket::new(granularity, label));

        match kind {
            TransactionKind::Income => bucket.income_total += txn.amount,
            TransactionKind::Expense => bucket.expense_total += txn.amount,
        }
        bucket.transaction_count += 1;
    }

    buckets.into_values().collect()
}

/// Income, expense and record counts across the whole set
///
/// Undated records are included: a missing date says nothing about whether
/// the money moved.
pub fn summarize(transactions: &[Transaction]) -> Totals {
    let mut totals = Totals {
        record_count: transactions.len(),
        ..Totals::default()
    };

    for txn in transactions {
        if !txn.is_valid() {
            totals.flagged_count += 1;
        }
        match txn.kind {
            Some(TransactionKind::Income) if txn.counts_toward_totals() => {
                totals.income += txn.amount;
                totals.counted_count += 1;
            }
            Some(TransactionKind::Expense) if txn.counts_toward_totals() => {
                totals.expense += txn.amount;
                totals.counted_count += 1;
            }
            _ => {}
        }
    }

    totals
}
