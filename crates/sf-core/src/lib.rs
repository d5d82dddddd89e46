//! sf-core - Core library for Syncflow
//!
//! This crate provides the record model shared by every stage, the pure diff
//! computation used by reconciliation, configuration parsing, and run
//! history persistence.

pub mod checksum;
pub mod config;
pub mod diff;
pub mod error;
pub mod record;
pub mod run_history;
pub mod schema;
pub mod source;
pub mod value;

pub use checksum::compute_checksum;
pub use config::{Config, SourceLocation};
pub use diff::{changed_fields, compute_diff, Diff, DiffSummary, FieldChange};
pub use error::{CoreError, CoreResult};
pub use record::{Dataset, Record, RecordId, StoreSnapshot};
pub use run_history::{RunHistory, RunRecord, RunStatus};
pub use schema::{Field, FieldType, Schema};
pub use source::{DatasetSource, SourceError};
pub use value::{round_to, Value};
