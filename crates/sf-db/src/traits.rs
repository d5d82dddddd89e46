//! Store adapter trait definitions

use crate::error::DbResult;
use async_trait::async_trait;
use sf_core::{Dataset, Diff, DiffSummary, Schema, StoreSnapshot};
use std::fmt;
use std::sync::Arc;

/// Write step inside a store transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyPhase {
    /// Table creation plus initial load
    Load,
    /// Delete sub-batch
    Delete,
    /// Update sub-batch
    Update,
    /// Insert sub-batch
    Insert,
    /// Final commit
    Commit,
}

impl fmt::Display for ApplyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyPhase::Load => write!(f, "load"),
            ApplyPhase::Delete => write!(f, "delete"),
            ApplyPhase::Update => write!(f, "update"),
            ApplyPhase::Insert => write!(f, "insert"),
            ApplyPhase::Commit => write!(f, "commit"),
        }
    }
}

/// Sole gateway to the persistent table.
///
/// Implementations must be Send + Sync for async operation. Every write
/// method is atomic: it either fully succeeds or leaves the store exactly
/// as it was.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Check whether the table exists
    async fn table_exists(&self) -> DbResult<bool>;

    /// Create the table from the dataset's schema and load every record.
    ///
    /// On failure the table does not exist afterwards.
    async fn create_and_load(&self, dataset: &Dataset) -> DbResult<usize>;

    /// Full scan decoded with `schema`, ordered by identifier
    async fn read_snapshot(&self, schema: &Arc<Schema>) -> DbResult<StoreSnapshot>;

    /// Apply delete, update, then insert sub-batches in one transaction.
    ///
    /// Empty sub-batches are skipped. Any failure rolls the whole diff back.
    async fn apply_diff(&self, schema: &Schema, diff: &Diff) -> DbResult<DiffSummary>;

    /// Store type identifier for logging
    fn db_type(&self) -> &'static str;
}

/// Hands out a fresh store handle per run.
///
/// The handle owns its connection; dropping it releases the connection on
/// every exit path.
pub trait StoreConnector: Send + Sync {
    /// Open a new store handle
    fn connect(&self) -> DbResult<Box<dyn RecordStore>>;

    /// Human-readable target for logs
    fn describe(&self) -> String;
}
