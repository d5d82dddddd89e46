//! Pure diff computation between a fresh dataset and the store snapshot.
//!
//! The diff partitions identifiers into inserts, updates, and deletes. It
//! performs no I/O; applying it is the store adapter's job.

use crate::error::{CoreError, CoreResult};
use crate::record::{Dataset, Record, RecordId, StoreSnapshot};
use crate::schema::Schema;
use crate::value::Value;
use serde::Serialize;
use std::fmt;

/// Insert / update / delete partition for one (dataset, snapshot) pair.
///
/// Every list is sorted by identifier and the three identifier sets are
/// pairwise disjoint.
#[derive(Debug, Clone, Default)]
pub struct Diff {
    /// Dataset records whose identifier is absent from the snapshot
    pub to_insert: Vec<Record>,
    /// Dataset versions of records whose content changed
    pub to_update: Vec<Record>,
    /// Snapshot identifiers absent from the dataset
    pub to_delete: Vec<RecordId>,
}

/// Row counts of a diff
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl DiffSummary {
    /// Total number of touched rows
    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.deleted
    }
}

impl fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} inserted, {} updated, {} deleted",
            self.inserted, self.updated, self.deleted
        )
    }
}

impl Diff {
    /// Whether applying the diff would change nothing
    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    /// Row counts per partition
    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            inserted: self.to_insert.len(),
            updated: self.to_update.len(),
            deleted: self.to_delete.len(),
        }
    }

    /// Identifiers of inserted records
    pub fn insert_ids(&self) -> Vec<RecordId> {
        self.to_insert.iter().map(Record::id).collect()
    }

    /// Identifiers of updated records
    pub fn update_ids(&self) -> Vec<RecordId> {
        self.to_update.iter().map(Record::id).collect()
    }
}

/// Compute the minimal diff that makes `snapshot` mirror `dataset`.
///
/// Fails with `DuplicateIdentifier` before producing anything when the
/// dataset repeats an identifier, and with `SchemaMismatch` when the two
/// sides were decoded with different schemas.
pub fn compute_diff(dataset: &Dataset, snapshot: &StoreSnapshot) -> CoreResult<Diff> {
    let schema = dataset.schema();
    if schema.as_ref() != snapshot.schema().as_ref() {
        return Err(CoreError::SchemaMismatch {
            message: format!(
                "dataset fields [{}] vs snapshot fields [{}]",
                schema.field_names().join(", "),
                snapshot.schema().field_names().join(", ")
            ),
        });
    }

    let incoming = dataset.index_by_id()?;
    let mut diff = Diff::default();

    for (id, record) in &incoming {
        match snapshot.get(*id) {
            None => diff.to_insert.push((*record).clone()),
            Some(existing) if !record.same_content(existing, schema) => {
                diff.to_update.push((*record).clone())
            }
            Some(_) => {}
        }
    }

    diff.to_delete = snapshot
        .ids()
        .filter(|id| !incoming.contains_key(id))
        .collect();

    log::debug!(
        "Computed diff over {} incoming and {} stored records: {}",
        incoming.len(),
        snapshot.len(),
        diff.summary()
    );
    Ok(diff)
}

/// One differing field of an updated record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub field: String,
    pub old: Value,
    pub new: Value,
}

/// List the non-identifier fields whose values differ between `new` and `old`.
pub fn changed_fields(schema: &Schema, new: &Record, old: &Record) -> Vec<FieldChange> {
    schema
        .value_fields()
        .filter_map(|(i, field)| {
            let n = new.value(i).cloned().unwrap_or(Value::Null);
            let o = old.value(i).cloned().unwrap_or(Value::Null);
            if n.canonical_eq(&o, field.field_type) {
                None
            } else {
                Some(FieldChange {
                    field: field.name.clone(),
                    old: o,
                    new: n,
                })
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "diff_test.rs"]
mod tests;
