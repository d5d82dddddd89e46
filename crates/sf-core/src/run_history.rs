//! Persistent history of pipeline runs
//!
//! Every run, successful or not, appends one [`RunRecord`] to
//! `target/run_results.json`. Only the most recent runs are kept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::CoreResult;

/// Number of runs retained in the history file
pub const MAX_HISTORY: usize = 30;

/// Final status of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Dataset produced and reconciled
    Succeeded,
    /// A stage failed; the store is unchanged
    Failed,
    /// Rejected because another run was in flight
    Skipped,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Succeeded => write!(f, "succeeded"),
            RunStatus::Failed => write!(f, "failed"),
            RunStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Outcome of a single run as persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Unique identifier for this run
    pub run_id: String,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run returned
    pub finished_at: DateTime<Utc>,

    /// Final status
    pub status: RunStatus,

    /// Stage that failed, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,

    /// Rows appended
    pub inserted: usize,

    /// Rows rewritten
    pub updated: usize,

    /// Rows removed
    pub deleted: usize,

    /// Whether the table was created by this run
    pub bootstrap: bool,

    /// Fingerprint of the dataset that was reconciled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    /// Failure cause
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunRecord {
    /// Run duration in milliseconds
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// Most recent runs, oldest first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunHistory {
    pub runs: Vec<RunRecord>,
}

impl RunHistory {
    /// Load run history from a file path, empty when the file is absent
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let history: RunHistory = serde_json::from_str(&content)?;
        Ok(history)
    }

    /// Save run history to a file path atomically
    ///
    /// Writes a sibling temp file, then renames it over `path`
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Append a run, dropping the oldest entries beyond [`MAX_HISTORY`]
    pub fn push(&mut self, record: RunRecord) {
        self.runs.push(record);
        if self.runs.len() > MAX_HISTORY {
            let excess = self.runs.len() - MAX_HISTORY;
            self.runs.drain(..excess);
        }
    }

    /// The latest run
    pub fn last(&self) -> Option<&RunRecord> {
        self.runs.last()
    }

    /// The latest successful run
    pub fn last_success(&self) -> Option<&RunRecord> {
        self.runs
            .iter()
            .rev()
            .find(|r| r.status == RunStatus::Succeeded)
    }
}

#[cfg(test)]
#[path = "run_history_test.rs"]
mod tests;
