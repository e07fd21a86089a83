//! Session context and report snapshots
//!
//! A session is scoped to one owner. Everything the engine would otherwise
//! read from ambient state (owner identity, thresholds, budget limits) is
//! carried here and passed in at construction.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::Settings;
use crate::models::{BudgetLimit, RawTransaction, Transaction};
use crate::services::normalize;

/// Explicit per-session configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    /// Owner the session is scoped to; `None` accepts every record
    pub owner_email: Option<String>,
    pub settings: Settings,
    pub budgets: Vec<BudgetLimit>,
}

impl SessionContext {
    pub fn new(owner_email: Option<String>, settings: Settings) -> Self {
        Self {
            owner_email: owner_email
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
            settings,
            budgets: Vec::new(),
        }
    }

    pub fn with_budgets(mut self, budgets: Vec<BudgetLimit>) -> Self {
        self.budgets = budgets;
        self
    }

    /// Owner identity as passed to the data source
    pub fn owner_key(&self) -> &str {
        self.owner_email.as_deref().unwrap_or_default()
    }

    /// Whether a record with this owner belongs to the session
    ///
    /// Records without an owner are accepted. Comparison ignores case.
    pub fn owns(&self, record_owner: &str) -> bool {
        match &self.owner_email {
            None => true,
            Some(owner) => {
                let record_owner = record_owner.trim();
                record_owner.is_empty() || record_owner.eq_ignore_ascii_case(owner)
            }
        }
    }

    /// Budget limit for a category, if one is configured
    pub fn budget_for(&self, category: &str) -> Option<&BudgetLimit> {
        self.budgets.iter().find(|b| b.category == category)
    }
}

/// One normalized, owner-filtered view of the data source
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSnapshot {
    pub transactions: Vec<Transaction>,
    /// Records dropped because they belong to another owner
    pub excluded_foreign: usize,
    /// When the batch was fetched; `None` before the first fetch
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Refresh generation that produced this snapshot
    pub epoch: u64,
}

impl ReportSnapshot {
    /// Snapshot with no data, used before the first fetch completes
    pub fn empty() -> Self {
        Self {
            transactions: Vec::new(),
            excluded_foreign: 0,
            refreshed_at: None,
            epoch: 0,
        }
    }

    /// Normalize a raw batch and keep the session owner's records
    pub fn build(context: &SessionContext, raw: &[RawTransaction], epoch: u64) -> Self {
        let normalized = normalize(raw);
        let total = normalized.len();

        let transactions: Vec<Transaction> = normalized
            .into_iter()
            .filter(|txn| context.owns(&txn.owner_email))
            .collect();
        let excluded_foreign = total - transactions.len();

        if excluded_foreign > 0 {
            debug!(excluded_foreign, "dropped records owned by another user");
        }

        Self {
            transactions,
            excluded_foreign,
            refreshed_at: Some(Utc::now()),
            epoch,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.refreshed_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_batch() -> Vec<RawTransaction> {
        serde_json::from_value(json!([
            {"id": "1", "amount": 10, "kind": "expense", "category": "Food", "occurredAt": "2024-01-02", "ownerEmail": "A@Example.com"},
            {"id": "2", "amount": 20, "kind": "expense", "category": "Food", "occurredAt": "2024-01-03", "ownerEmail": "other@example.com"},
            {"id": "3", "amount": 30, "kind": "income", "category": "Salary", "occurredAt": "2024-01-04"}
        ]))
        .unwrap()
    }

    #[test]
    fn test_owner_filter_ignores_case() {
        let context = SessionContext::new(Some("a@example.com".into()), Settings::default());
        let snapshot = ReportSnapshot::build(&context, &raw_batch(), 1);

        let ids: Vec<&str> = snapshot.transactions.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(snapshot.excluded_foreign, 1);
        assert_eq!(snapshot.epoch, 1);
        assert!(snapshot.is_loaded());
    }

    #[test]
    fn test_unscoped_session_keeps_everything() {
        let context = SessionContext::new(Some("  ".into()), Settings::default());
        assert_eq!(context.owner_email, None);
        assert_eq!(context.owner_key(), "");

        let snapshot = ReportSnapshot::build(&context, &raw_batch(), 0);
        assert_eq!(snapshot.transactions.len(), 3);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = ReportSnapshot::empty();
        assert!(!snapshot.is_loaded());
        assert!(snapshot.transactions.is_empty());
    }

    #[test]
    fn test_budget_lookup() {
        let context = SessionContext::new(None, Settings::default())
            .with_budgets(vec![BudgetLimit::new("Food", 500.0)]);
        assert!(context.budget_for("Food").is_some());
        assert!(context.budget_for("food").is_none());
    }
}
