//! Error types for sf-db

use crate::traits::ApplyPhase;
use thiserror::Error;

/// Store adapter errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection or IO failure; the store is left untouched (D001)
    #[error("[D001] Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Persisted table does not match the declared record schema (D002)
    #[error("[D002] Schema mismatch on table {table}: {message}")]
    SchemaMismatch { table: String, message: String },

    /// A sub-batch failed and the transaction was rolled back (D003)
    #[error("[D003] Transaction aborted during {phase}: {message}")]
    TransactionAborted { phase: ApplyPhase, message: String },

    /// Query execution error outside a write transaction (D004)
    #[error("[D004] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Table not found (D005)
    #[error("[D005] Table not found: {0}")]
    TableNotFound(String),

    /// Mutex poisoned (D006)
    #[error("[D006] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// A stored row could not be decoded into a record (D007)
    #[error("[D007] Invalid stored data: {0}")]
    InvalidData(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error does not expose structured variants, so the catalog
        // error is recognised by its message.
        let msg = err.to_string();
        if msg.contains("Catalog Error") && msg.contains("Table") && msg.contains("does not exist")
        {
            DbError::TableNotFound(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}

impl DbError {
    /// Wrap any error raised inside a write transaction
    pub(crate) fn aborted(phase: ApplyPhase, err: impl std::fmt::Display) -> Self {
        DbError::TransactionAborted {
            phase,
            message: err.to_string(),
        }
    }
}
