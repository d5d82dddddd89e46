//! Error types for sf-sync

use sf_core::{CoreError, SourceError};
use sf_db::DbError;
use thiserror::Error;

/// Reconciliation errors
#[derive(Error, Debug)]
pub enum SyncError {
    /// S001: The dataset could not be produced
    #[error("[S001] {0}")]
    Source(#[from] SourceError),

    /// S002: The store rejected a read or write
    #[error("[S002] {0}")]
    Store(#[from] DbError),

    /// S003: The dataset violates a record model invariant
    #[error("[S003] {0}")]
    Model(#[from] CoreError),
}

/// Result type alias for SyncError
pub type SyncResult<T> = Result<T, SyncError>;
