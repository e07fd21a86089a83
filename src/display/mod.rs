//! Display formatting for terminal output
//!
//! Provides utilities for formatting report values for terminal display.

pub mod report;

pub use report::{format_bar, format_currency, format_percentage, format_zone, truncate};
