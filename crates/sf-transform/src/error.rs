//! Error types for sf-transform

use sf_core::{CoreError, SourceError};
use thiserror::Error;

/// Transform stage errors
#[derive(Error, Debug)]
pub enum TransformError {
    /// T001: Local extract could not be read
    #[error("[T001] Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// T002: Remote extract could not be fetched
    #[error("[T002] HTTP request to {url} failed: {message}")]
    Http { url: String, message: String },

    /// T003: Extract is not well-formed CSV
    #[error("[T003] Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// T004: Extract lacks a required column
    #[error("[T004] Missing required column '{0}'")]
    MissingColumn(String),

    /// T005: Extract body is empty
    #[error("[T005] Empty extract from {0}")]
    EmptyExtract(String),

    /// T006: Title pattern failed to compile
    #[error("[T006] Invalid title pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// T007: Derived rows do not fit the declared schema
    #[error("[T007] {0}")]
    Core(#[from] CoreError),
}

/// Result type alias for TransformError
pub type TransformResult<T> = Result<T, TransformError>;

impl TransformError {
    /// Whether the error happened before any row was transformed
    pub fn is_extraction(&self) -> bool {
        matches!(
            self,
            TransformError::Read { .. }
                | TransformError::Http { .. }
                | TransformError::Csv(_)
                | TransformError::MissingColumn(_)
                | TransformError::EmptyExtract(_)
        )
    }
}

impl From<TransformError> for SourceError {
    fn from(err: TransformError) -> Self {
        if err.is_extraction() {
            SourceError::Extraction(err.to_string())
        } else {
            SourceError::Transform(err.to_string())
        }
    }
}
