//! sf-sync - Reconciliation and run orchestration for Syncflow
//!
//! This crate drives the store adapter: it reconciles one dataset into the
//! store (`engine`), sequences full runs with stage-tagged failures
//! (`coordinator`), and repeats them on a daily trigger (`schedule`).

pub mod coordinator;
pub mod engine;
pub mod error;
pub mod schedule;

pub use coordinator::{
    to_run_record, RunCoordinator, RunFailure, RunOutcome, RunResult, RunStage, StageError,
};
pub use engine::{preview, reconcile, Preview, ReconcileOutcome};
pub use error::{SyncError, SyncResult};
pub use schedule::{DailySchedule, Scheduler};
