//! Data source boundary
//!
//! The engine never talks to a transport directly. A [`TransactionSource`]
//! delivers raw batches for an owner; transport timeouts and retries are
//! the source's business.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;

use crate::error::ReportError;
use crate::models::RawTransaction;

/// A data source failed to deliver records
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<FetchError> for ReportError {
    fn from(err: FetchError) -> Self {
        Self::FetchFailure(err.message)
    }
}

/// Anything that can deliver raw transaction batches
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Fetch every raw record visible to `owner_email`
    async fn fetch_transactions(&self, owner_email: &str)
        -> Result<Vec<RawTransaction>, FetchError>;
}

/// Source that re-reads a JSON file on every fetch
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TransactionSource for JsonFileSource {
    async fn fetch_transactions(&self, _owner_email: &str) -> Result<Vec<RawTransaction>, FetchError> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            FetchError::new(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        RawTransaction::parse_batch(&contents).map_err(|e| FetchError::new(e.to_string()))
    }
}

/// In-memory source whose batch can be replaced at any time
#[derive(Debug, Default)]
pub struct MemorySource {
    records: Mutex<Vec<RawTransaction>>,
}

impl MemorySource {
    pub fn new(records: Vec<RawTransaction>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// Replace the batch served by later fetches
    pub fn replace(&self, records: Vec<RawTransaction>) {
        *self.records.lock().unwrap_or_else(PoisonError::into_inner) = records;
    }

    /// Append one record to the batch
    pub fn push(&self, record: RawTransaction) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

#[async_trait]
impl TransactionSource for MemorySource {
    async fn fetch_transactions(&self, _owner_email: &str) -> Result<Vec<RawTransaction>, FetchError> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
