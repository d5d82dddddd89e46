//! sf-transform - Transform stage for Syncflow
//!
//! Extracts the raw passenger CSV, fills missing values, derives the
//! `Title` column, and min-max normalises the numeric columns into the
//! canonical dataset handed to reconciliation.

pub mod error;
pub mod extract;
pub mod features;
pub mod normalize;
pub mod pipeline;
pub mod preprocess;
pub mod schema;

pub use error::{TransformError, TransformResult};
pub use extract::{parse_passengers, Extractor, Passenger};
pub use pipeline::{TitanicPipeline, TitanicTransform};
pub use schema::titanic_schema;
