//! # Sync Error Types
//!
//! Errors raised while assembling snapshots and summaries. Storage
//! failures are carried unchanged so callers keep their error class.

use kensai_core::CoreError;
use kensai_db::{DbError, ErrorClass};
use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A store read failed. The whole call fails; no partial results.
    #[error(transparent)]
    Storage(#[from] DbError),

    /// Stored data could not be summarized (unreadable date, amount out of
    /// range).
    #[error("Ledger error: {0}")]
    Ledger(#[from] CoreError),
}

impl SyncError {
    /// Returns the error's class.
    ///
    /// Ledger failures come from data already in the store, so they are
    /// storage-class unless they wrap a validation error.
    pub fn class(&self) -> ErrorClass {
        match self {
            SyncError::Storage(err) => err.class(),
            SyncError::Ledger(CoreError::Validation(_)) => ErrorClass::Validation,
            SyncError::Ledger(_) => ErrorClass::Storage,
        }
    }
}
