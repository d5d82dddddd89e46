//! sf-db - Store adapter for Syncflow
//!
//! This crate provides the `RecordStore` trait, the sole gateway to the
//! persistent table, and its DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod sql;
pub mod traits;

pub use duckdb::{DuckDbConnector, DuckDbStore};
pub use error::{DbError, DbResult};
pub use traits::{ApplyPhase, RecordStore, StoreConnector};
