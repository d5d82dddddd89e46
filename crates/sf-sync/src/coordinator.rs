//! Run coordinator
//!
//! Sequences one end-to-end run (produce the dataset, connect to the store,
//! reconcile) and turns every failure into a [`RunFailure`] tagged with the
//! stage it came from. Nothing escapes `run_once`, so the scheduler loop
//! survives a bad run.

use crate::engine::{self, Preview, ReconcileOutcome};
use crate::error::SyncError;
use chrono::{DateTime, Utc};
use sf_core::{Dataset, DatasetSource, RunRecord, RunStatus};
use sf_db::StoreConnector;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Stage a run failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    /// Producing the dataset
    Extract,
    /// Opening the store connection
    Connect,
    /// Diffing and applying
    Reconcile,
    /// Another run was still in flight
    Busy,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStage::Extract => write!(f, "extract"),
            RunStage::Connect => write!(f, "connect"),
            RunStage::Reconcile => write!(f, "reconcile"),
            RunStage::Busy => write!(f, "busy"),
        }
    }
}

/// Error tagged with the stage that raised it
#[derive(Error, Debug)]
#[error("{stage} failed: {source}")]
pub struct StageError {
    pub stage: RunStage,
    #[source]
    pub source: SyncError,
}

impl StageError {
    fn at(stage: RunStage) -> impl FnOnce(SyncError) -> Self {
        move |source| StageError { stage, source }
    }
}

/// A run that reconciled successfully
#[derive(Debug, Clone)]
pub struct RunResult {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    /// The table was created by this run
    pub bootstrap: bool,
    /// Records in the reconciled dataset
    pub records: usize,
    /// Order-independent hash of the reconciled dataset
    pub fingerprint: String,
}

/// A run that stopped before or during reconciliation
#[derive(Debug, Clone)]
pub struct RunFailure {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stage: RunStage,
    pub cause: String,
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run {} failed at {}: {}", self.run_id, self.stage, self.cause)
    }
}

pub type RunOutcome = Result<RunResult, RunFailure>;

/// Persisted form of a run outcome
pub fn to_run_record(outcome: &RunOutcome) -> RunRecord {
    match outcome {
        Ok(r) => RunRecord {
            run_id: r.run_id.to_string(),
            started_at: r.started_at,
            finished_at: r.finished_at,
            status: RunStatus::Succeeded,
            stage: None,
            inserted: r.inserted,
            updated: r.updated,
            deleted: r.deleted,
            bootstrap: r.bootstrap,
            fingerprint: Some(r.fingerprint.clone()),
            error: None,
        },
        Err(f) => RunRecord {
            run_id: f.run_id.to_string(),
            started_at: f.started_at,
            finished_at: f.finished_at,
            status: if f.stage == RunStage::Busy {
                RunStatus::Skipped
            } else {
                RunStatus::Failed
            },
            stage: Some(f.stage.to_string()),
            inserted: 0,
            updated: 0,
            deleted: 0,
            bootstrap: false,
            fingerprint: None,
            error: Some(f.cause.clone()),
        },
    }
}

/// Owns the dataset source and the store connector; one run at a time.
pub struct RunCoordinator {
    source: Arc<dyn DatasetSource>,
    connector: Arc<dyn StoreConnector>,
    in_flight: Mutex<()>,
}

impl RunCoordinator {
    pub fn new(source: Arc<dyn DatasetSource>, connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            source,
            connector,
            in_flight: Mutex::new(()),
        }
    }

    /// Execute one run.
    ///
    /// An overlapping call returns immediately with stage [`RunStage::Busy`].
    pub async fn run_once(&self) -> RunOutcome {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        let Ok(_guard) = self.in_flight.try_lock() else {
            log::warn!("run {} skipped: a previous run is still in flight", run_id);
            return Err(RunFailure {
                run_id,
                started_at,
                finished_at: Utc::now(),
                stage: RunStage::Busy,
                cause: "a previous run is still in flight".to_string(),
            });
        };

        log::info!(
            "run {} started: {} -> {}",
            run_id,
            self.source.describe(),
            self.connector.describe()
        );

        match self.execute().await {
            Ok((dataset, outcome)) => {
                let summary = outcome.summary();
                let result = RunResult {
                    run_id,
                    started_at,
                    finished_at: Utc::now(),
                    inserted: summary.inserted,
                    updated: summary.updated,
                    deleted: summary.deleted,
                    bootstrap: outcome.is_bootstrap(),
                    records: dataset.len(),
                    fingerprint: dataset.fingerprint(),
                };
                log::info!("run {} completed: {}", run_id, summary);
                Ok(result)
            }
            Err(e) => {
                log::error!("run failed: {}", e);
                Err(RunFailure {
                    run_id,
                    started_at,
                    finished_at: Utc::now(),
                    stage: e.stage,
                    cause: e.source.to_string(),
                })
            }
        }
    }

    async fn execute(&self) -> Result<(Dataset, ReconcileOutcome), StageError> {
        let dataset = self
            .source
            .produce()
            .await
            .map_err(|e| StageError::at(RunStage::Extract)(e.into()))?;

        // The handle, and with it the connection, is dropped on every exit path.
        let store = self
            .connector
            .connect()
            .map_err(|e| StageError::at(RunStage::Connect)(e.into()))?;

        let outcome = engine::reconcile(store.as_ref(), &dataset)
            .await
            .map_err(StageError::at(RunStage::Reconcile))?;
        Ok((dataset, outcome))
    }

    /// Produce the dataset and compute the diff without applying it.
    pub async fn preview(&self) -> Result<(Dataset, Preview), StageError> {
        let _guard = self.in_flight.lock().await;
        let dataset = self
            .source
            .produce()
            .await
            .map_err(|e| StageError::at(RunStage::Extract)(e.into()))?;
        let store = self
            .connector
            .connect()
            .map_err(|e| StageError::at(RunStage::Connect)(e.into()))?;
        let preview = engine::preview(store.as_ref(), &dataset)
            .await
            .map_err(StageError::at(RunStage::Reconcile))?;
        Ok((dataset, preview))
    }
}

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod tests;
