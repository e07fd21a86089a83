//! Sync controller
//!
//! Owns the fetch lifecycle of a session: periodic polling, out-of-band
//! change notifications, coalescing and teardown.

pub mod controller;
pub mod source;

pub use controller::{
    ChangeNotifier, RefreshCause, RefreshOutcome, SyncController, SyncHandle, SyncPhase,
    SyncStatus,
};
pub use source::{FetchError, JsonFileSource, MemorySource, TransactionSource};
