//! Business logic layer
//!
//! Pure computations over transaction batches. Nothing here holds state or
//! touches I/O, so every function is safe to call concurrently on
//! independent snapshots.

pub mod aggregate;
pub mod classify;
pub mod normalize;

pub use aggregate::{by_category, by_period, summarize, Totals, UndatedPolicy};
pub use classify::{account_health, classify, classify_budgets, BudgetStatus};
pub use normalize::{normalize, normalize_record, parse_amount_text, parse_timestamp_text};
