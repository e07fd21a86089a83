//! Reports module for the reporting engine
//!
//! Provides the session-scoped report engine and the reports it serves:
//! dashboard summary, category breakdown, period report, budget status and
//! day-grouped transaction history.

pub mod budget_status;
pub mod category;
pub mod dashboard;
pub mod engine;
pub mod history;
pub mod period;
pub mod session;

pub use budget_status::BudgetStatusReport;
pub use category::{CategoryBreakdown, CategoryShare};
pub use dashboard::DashboardSummary;
pub use engine::{ReportEngine, ZoneScope};
pub use history::{DayGroup, TransactionHistory};
pub use period::PeriodReport;
pub use session::{ReportSnapshot, SessionContext};
