//! Report engine
//!
//! The read side of a session. An engine always answers from the latest
//! snapshot published to it; every query recomputes from that snapshot, so
//! results for one snapshot are consistent across queries.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::watch;

use crate::error::{ReportError, ReportResult};
use crate::export::{self, ExportDocument, ExportFormat, ExportOptions, ExportPayload};
use crate::models::{Classification, Granularity, PeriodBucket, RawTransaction};
use crate::services::{account_health, by_category, by_period, classify, summarize, Totals};

use super::budget_status::BudgetStatusReport;
use super::category::CategoryBreakdown;
use super::dashboard::DashboardSummary;
use super::history::TransactionHistory;
use super::period::PeriodReport;
use super::session::{ReportSnapshot, SessionContext};

/// What a zone is computed for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ZoneScope {
    /// Whole-account health: expense against income
    Account,
    /// Spend in one category against its budget limit
    Category(String),
}

impl fmt::Display for ZoneScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account => write!(f, "account"),
            Self::Category(name) => write!(f, "category:{}", name),
        }
    }
}

impl FromStr for ZoneScope {
    type Err = ReportError;

    /// Parse `account` or `category:<name>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        if key.eq_ignore_ascii_case("account") || key.eq_ignore_ascii_case("health") {
            return Ok(Self::Account);
        }
        match key.split_once(':') {
            Some((prefix, name)) if prefix.eq_ignore_ascii_case("category") => {
                let name = name.trim();
                if name.is_empty() {
                    Err(ReportError::UnknownScope(s.to_string()))
                } else {
                    Ok(Self::Category(name.to_string()))
                }
            }
            _ => Err(ReportError::UnknownScope(s.to_string())),
        }
    }
}

/// Query surface over the latest snapshot of a session
#[derive(Debug, Clone)]
pub struct ReportEngine {
    context: Arc<SessionContext>,
    snapshot: watch::Receiver<Arc<ReportSnapshot>>,
}

impl ReportEngine {
    /// Engine over a fixed batch of raw records
    pub fn new(context: SessionContext, raw: &[RawTransaction]) -> Self {
        let snapshot = ReportSnapshot::build(&context, raw, 0);
        let (_publisher, receiver) = watch::channel(Arc::new(snapshot));
        Self {
            context: Arc::new(context),
            snapshot: receiver,
        }
    }

    /// Engine that follows snapshots published on a watch channel
    pub fn from_watch(
        context: Arc<SessionContext>,
        snapshot: watch::Receiver<Arc<ReportSnapshot>>,
    ) -> Self {
        Self { context, snapshot }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// The snapshot queries currently answer from
    pub fn snapshot(&self) -> Arc<ReportSnapshot> {
        Arc::clone(&self.snapshot.borrow())
    }

    /// Expense total per category
    pub fn get_category_totals(&self) -> BTreeMap<String, f64> {
        let snapshot = self.snapshot();
        by_category(&snapshot.transactions, self.context.settings.undated_policy())
    }

    /// Income and expense per period, ascending by period
    pub fn get_period_report(&self, granularity: Granularity) -> Vec<PeriodBucket> {
        by_period(&self.snapshot().transactions, granularity)
    }

    /// Zone for a scope
    ///
    /// A category without a configured budget has no reference and
    /// classifies as Safe with `missing_reference` set.
    pub fn get_zone(&self, scope: &ZoneScope) -> Classification {
        let settings = &self.context.settings;
        match scope {
            ZoneScope::Account => account_health(&self.totals(), &settings.health_thresholds),
            ZoneScope::Category(name) => {
                let Some(budget) = self.context.budget_for(name) else {
                    return Classification::unreferenced();
                };
                let spent = self.get_category_totals().get(name).copied().unwrap_or(0.0);
                classify(spent, budget.limit_amount, &settings.budget_thresholds)
            }
        }
    }

    /// Zone for a scope key such as `account` or `category:Food`
    pub fn get_zone_by_key(&self, key: &str) -> ReportResult<Classification> {
        let scope: ZoneScope = key.parse()?;
        Ok(self.get_zone(&scope))
    }

    /// Why a scope has no usable reference, or `None` if it has one
    pub fn reference_issue(&self, scope: &ZoneScope) -> Option<ReportError> {
        if !self.get_zone(scope).missing_reference {
            return None;
        }
        let reason = match scope {
            ZoneScope::Account => "no income recorded".to_string(),
            ZoneScope::Category(name) => match self.context.budget_for(name) {
                None => format!("no budget limit for category '{}'", name),
                Some(_) => format!("budget limit for category '{}' is not positive", name),
            },
        };
        Some(ReportError::MissingReference(reason))
    }

    /// One malformed-record diagnostic per flagged record, indexed by
    /// position in the snapshot
    pub fn diagnostics(&self) -> Vec<ReportError> {
        self.snapshot()
            .transactions
            .iter()
            .enumerate()
            .filter_map(|(index, txn)| txn.diagnostic(index))
            .collect()
    }

    pub fn totals(&self) -> Totals {
        summarize(&self.snapshot().transactions)
    }

    pub fn dashboard(&self) -> DashboardSummary {
        DashboardSummary::generate(
            &self.snapshot().transactions,
            self.context.owner_email.as_deref(),
            &self.context.settings.health_thresholds,
        )
    }

    pub fn budget_status(&self) -> BudgetStatusReport {
        let settings = &self.context.settings;
        BudgetStatusReport::generate(
            &self.snapshot().transactions,
            &self.context.budgets,
            &settings.budget_thresholds,
            settings.undated_policy(),
        )
    }

    pub fn category_breakdown(&self) -> CategoryBreakdown {
        CategoryBreakdown::generate(
            &self.snapshot().transactions,
            self.context.settings.undated_policy(),
        )
    }

    /// Period report for any granularity
    pub fn period_report(&self, granularity: Granularity) -> PeriodReport {
        PeriodReport::generate(&self.snapshot().transactions, granularity)
    }

    /// Records grouped by day, labelled relative to `today`
    pub fn history(&self, today: NaiveDate) -> TransactionHistory {
        TransactionHistory::generate(&self.snapshot().transactions, today)
    }

    /// Monthly income against expense
    pub fn monthly_series(&self) -> Vec<PeriodBucket> {
        self.get_period_report(Granularity::Monthly)
    }

    /// Canonical export document for the current snapshot
    pub fn export_document(&self) -> ExportDocument {
        let snapshot = self.snapshot();
        let options =
            ExportOptions::from_settings(&self.context.settings, self.context.owner_email.as_deref());
        ExportDocument::build(&snapshot.transactions, &summarize(&snapshot.transactions), &options)
    }

    /// Render one export format
    pub fn export_as(&self, format: ExportFormat) -> ReportResult<ExportPayload> {
        export::render(&self.export_document(), format)
    }

    /// Render every export format; each slot succeeds or fails on its own
    pub fn export_all(&self) -> Vec<(ExportFormat, ReportResult<ExportPayload>)> {
        export::render_all(&self.export_document())
    }
}
