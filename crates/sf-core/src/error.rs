//! Error types for sf-core

use crate::record::RecordId;
use thiserror::Error;

/// Core error type for Syncflow
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Schema declaration is malformed
    #[error("[E004] Invalid schema: {message}")]
    InvalidSchema { message: String },

    /// E005: Record does not conform to the declared schema
    #[error("[E005] Record {id} violates schema: {message}")]
    SchemaViolation { id: String, message: String },

    /// E006: Identifier appears more than once in a dataset or snapshot
    #[error("[E006] Duplicate identifier {id} in {origin}")]
    DuplicateIdentifier { id: RecordId, origin: &'static str },

    /// E007: Dataset and snapshot disagree on the record schema
    #[error("[E007] Schema mismatch between dataset and snapshot: {message}")]
    SchemaMismatch { message: String },

    /// E008: IO error
    #[error("[E008] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E009: IO error with file path context
    #[error("[E009] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E010: YAML parse error
    #[error("[E010] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// E011: Run history serialization error
    #[error("[E011] JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
