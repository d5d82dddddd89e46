//! CLI command implementations

pub(crate) mod common;
pub(crate) mod diff;
pub(crate) mod report;
pub(crate) mod run;
pub(crate) mod schedule;
pub(crate) mod validate;
