//! Boundary trait for the stage that produces the canonical dataset.

use crate::record::Dataset;
use async_trait::async_trait;
use thiserror::Error;

/// Failure raised while producing a dataset
#[derive(Error, Debug)]
pub enum SourceError {
    /// X001: Raw data could not be fetched or parsed
    #[error("[X001] Extraction failed: {0}")]
    Extraction(String),

    /// X002: Feature derivation rejected the extracted table
    #[error("[X002] Transform failed: {0}")]
    Transform(String),
}

/// Produces the canonical dataset for one run.
///
/// Implementations must surface extraction problems as errors, never as an
/// empty dataset, and must return numeric fields already canonicalized.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Extract and transform a fresh dataset
    async fn produce(&self) -> Result<Dataset, SourceError>;

    /// Short name used in logs
    fn describe(&self) -> String;
}
