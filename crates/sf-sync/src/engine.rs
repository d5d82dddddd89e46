//! Reconciliation engine
//!
//! Compares a freshly produced dataset with the store and applies the
//! minimal diff in one store transaction. A missing table takes the
//! bootstrap path instead: create it and load every record.

use crate::error::SyncResult;
use sf_core::{compute_diff, Dataset, Diff, DiffSummary, StoreSnapshot};
use sf_db::RecordStore;

/// What one reconciliation did to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The table did not exist; it was created and loaded
    Created { loaded: usize },
    /// The diff was applied to an existing table
    Applied(DiffSummary),
}

impl ReconcileOutcome {
    /// Row counts, with a bootstrap load counted as inserts
    pub fn summary(&self) -> DiffSummary {
        match self {
            ReconcileOutcome::Created { loaded } => DiffSummary {
                inserted: *loaded,
                ..DiffSummary::default()
            },
            ReconcileOutcome::Applied(summary) => *summary,
        }
    }

    pub fn is_bootstrap(&self) -> bool {
        matches!(self, ReconcileOutcome::Created { .. })
    }
}

/// Bring the store in line with `dataset`.
///
/// Duplicate identifiers are rejected before any write, on both paths.
pub async fn reconcile(store: &dyn RecordStore, dataset: &Dataset) -> SyncResult<ReconcileOutcome> {
    if !store.table_exists().await? {
        dataset.index_by_id()?;
        let loaded = store.create_and_load(dataset).await?;
        log::info!("table created, {} records loaded", loaded);
        return Ok(ReconcileOutcome::Created { loaded });
    }

    let snapshot = store.read_snapshot(dataset.schema()).await?;
    let diff = compute_diff(dataset, &snapshot)?;
    if diff.is_empty() {
        log::info!("store already mirrors the dataset, nothing to apply");
        return Ok(ReconcileOutcome::Applied(DiffSummary::default()));
    }

    let summary = store.apply_diff(dataset.schema(), &diff).await?;
    if summary.deleted > 0 {
        log::info!("{} deleted", summary.deleted);
    }
    if summary.updated > 0 {
        log::info!("{} updated", summary.updated);
    }
    if summary.inserted > 0 {
        log::info!("{} appended", summary.inserted);
    }
    Ok(ReconcileOutcome::Applied(summary))
}

/// A diff computed without touching the store
#[derive(Debug, Clone)]
pub struct Preview {
    /// The table does not exist yet; applying would bootstrap it
    pub bootstrap: bool,
    pub snapshot: StoreSnapshot,
    pub diff: Diff,
}

/// Compute what [`reconcile`] would do, without writing.
pub async fn preview(store: &dyn RecordStore, dataset: &Dataset) -> SyncResult<Preview> {
    let bootstrap = !store.table_exists().await?;
    let snapshot = if bootstrap {
        StoreSnapshot::empty(dataset.schema().clone())
    } else {
        store.read_snapshot(dataset.schema()).await?
    };
    let diff = compute_diff(dataset, &snapshot)?;
    Ok(Preview {
        bootstrap,
        snapshot,
        diff,
    })
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
