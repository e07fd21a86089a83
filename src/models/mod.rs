//! Core data models for the reporting engine
//!
//! Raw records as delivered by the data source, their normalized form, and
//! the derived values (period buckets, budget zones) computed from them.

pub mod budget;
pub mod period;
pub mod raw;
pub mod transaction;
pub mod zone;

pub use budget::BudgetLimit;
pub use period::{Granularity, PeriodBucket, PeriodParseError};
pub use raw::RawTransaction;
pub use transaction::{RecordIssue, Transaction, TransactionKind, UNCATEGORIZED};
pub use zone::{BudgetZone, Classification, ZoneThresholds};
