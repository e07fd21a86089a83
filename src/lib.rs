//! expense-report - Transaction aggregation and reporting engine
//!
//! This library turns raw, loosely-typed transaction records into grouped
//! summaries (by category and calendar period), budget-zone classifications
//! and export documents in four formats, and keeps them fresh through a
//! coalescing refresh controller.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Raw and normalized records, periods, budgets and zones
//! - `services`: Normalizer, aggregator and classifier
//! - `export`: Canonical export document and its renderers
//! - `reports`: Session context, report engine and terminal reports
//! - `sync`: Data source boundary and refresh controller
//! - `display`: Terminal formatting helpers
//! - `cli`: Command handlers for the binary
//!
//! # Example
//!
//! ```rust,ignore
//! use expense_report::config::{ReportPaths, Settings};
//! use expense_report::models::{Granularity, RawTransaction};
//! use expense_report::reports::{ReportEngine, SessionContext};
//!
//! let paths = ReportPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let raw = RawTransaction::parse_batch(&std::fs::read_to_string("transactions.json")?)?;
//!
//! let engine = ReportEngine::new(SessionContext::new(None, settings), &raw);
//! let months = engine.get_period_report(Granularity::Monthly);
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod sync;

pub use error::{ReportError, ReportResult};
