//! Records, the canonical dataset produced by one run, and the store snapshot.

use crate::checksum::compute_checksum;
use crate::error::{CoreError, CoreResult};
use crate::schema::Schema;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Stable record identifier, never regenerated across runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(v: i64) -> Self {
        RecordId(v)
    }
}

/// One row, values in schema order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    id: RecordId,
    values: Vec<Value>,
}

impl Record {
    /// Build a record from values in schema order, validating it against `schema`.
    ///
    /// Values are coerced into the declared representation (integers widen
    /// into float fields) so later comparisons never see storage artifacts.
    pub fn from_values(schema: &Schema, values: Vec<Value>) -> CoreResult<Self> {
        let raw_id = values.get(schema.id_index()).cloned().unwrap_or(Value::Null);
        let label = raw_id.to_string();

        if values.len() != schema.len() {
            return Err(CoreError::SchemaViolation {
                id: label,
                message: format!(
                    "expected {} values, found {}",
                    schema.len(),
                    values.len()
                ),
            });
        }

        let mut coerced = Vec::with_capacity(values.len());
        for (value, field) in values.into_iter().zip(schema.fields()) {
            if value.is_null() && !field.nullable {
                return Err(CoreError::SchemaViolation {
                    id: label,
                    message: format!("field '{}' is not nullable", field.name),
                });
            }
            let shown = value.to_string();
            let value = value
                .coerce(field.field_type)
                .ok_or_else(|| CoreError::SchemaViolation {
                    id: label.clone(),
                    message: format!(
                        "field '{}' expects {}, found {}",
                        field.name, field.field_type, shown
                    ),
                })?;
            coerced.push(value);
        }

        let id = coerced[schema.id_index()]
            .as_i64()
            .map(RecordId)
            .ok_or_else(|| CoreError::SchemaViolation {
                id: label,
                message: "identifier is not an integer".to_string(),
            })?;

        Ok(Self {
            id,
            values: coerced,
        })
    }

    /// The record identifier
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// All values in schema order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value at schema position `index`
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Value of the named field
    pub fn get<'a>(&'a self, schema: &Schema, name: &str) -> Option<&'a Value> {
        schema.index_of(name).and_then(|i| self.values.get(i))
    }

    /// Whether every non-identifier field equals `other`'s under the
    /// declared field types.
    pub fn same_content(&self, other: &Record, schema: &Schema) -> bool {
        schema.value_fields().all(|(i, field)| {
            match (self.values.get(i), other.values.get(i)) {
                (Some(a), Some(b)) => a.canonical_eq(b, field.field_type),
                _ => false,
            }
        })
    }

    /// SHA-256 over the canonical encoding of every field.
    ///
    /// Equal under [`same_content`](Self::same_content) plus equal ids implies
    /// equal checksums.
    pub fn checksum(&self, schema: &Schema) -> String {
        let encoded: Vec<String> = self
            .values
            .iter()
            .zip(schema.fields())
            .map(|(v, f)| v.canonical_encoding(f.field_type))
            .collect();
        compute_checksum(&encoded.join("\u{1f}"))
    }
}

/// Ordered records sharing one schema, produced by one transform invocation
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: Arc<Schema>,
    records: Vec<Record>,
}

impl Dataset {
    /// Build a dataset from already validated records.
    ///
    /// Identifier uniqueness is not checked here; the diff reports duplicates
    /// before any write happens.
    pub fn new(schema: Arc<Schema>, records: Vec<Record>) -> Self {
        Self { schema, records }
    }

    /// Validate raw value rows against `schema` and build a dataset.
    pub fn from_rows(schema: Arc<Schema>, rows: Vec<Vec<Value>>) -> CoreResult<Self> {
        let records = rows
            .into_iter()
            .map(|row| Record::from_values(&schema, row))
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(Self { schema, records })
    }

    /// An empty dataset
    pub fn empty(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            records: Vec::new(),
        }
    }

    /// The shared schema
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Records in production order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index records by identifier, failing on the first duplicate.
    pub fn index_by_id(&self) -> CoreResult<BTreeMap<RecordId, &Record>> {
        let mut index = BTreeMap::new();
        for record in &self.records {
            if index.insert(record.id(), record).is_some() {
                return Err(CoreError::DuplicateIdentifier {
                    id: record.id(),
                    origin: "dataset",
                });
            }
        }
        Ok(index)
    }

    /// Fingerprint of the whole dataset, independent of record order.
    pub fn fingerprint(&self) -> String {
        let mut sums: Vec<(RecordId, String)> = self
            .records
            .iter()
            .map(|r| (r.id(), r.checksum(&self.schema)))
            .collect();
        sums.sort();
        let joined: Vec<String> = sums.into_iter().map(|(_, s)| s).collect();
        compute_checksum(&joined.join("\n"))
    }
}

/// Immutable, id-ordered view of the store contents taken once per run
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    schema: Arc<Schema>,
    records: BTreeMap<RecordId, Record>,
}

impl StoreSnapshot {
    /// Build a snapshot, rejecting duplicate identifiers.
    pub fn new(schema: Arc<Schema>, records: Vec<Record>) -> CoreResult<Self> {
        let mut map = BTreeMap::new();
        for record in records {
            let id = record.id();
            if map.insert(id, record).is_some() {
                return Err(CoreError::DuplicateIdentifier {
                    id,
                    origin: "store snapshot",
                });
            }
        }
        Ok(Self {
            schema,
            records: map,
        })
    }

    /// Snapshot of a store with no rows
    pub fn empty(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            records: BTreeMap::new(),
        }
    }

    /// The schema the snapshot was decoded with
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Look up a record by identifier
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.get(&id)
    }

    /// Whether the identifier is present
    pub fn contains(&self, id: RecordId) -> bool {
        self.records.contains_key(&id)
    }

    /// Records in identifier order
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Identifiers in ascending order
    pub fn ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.records.keys().copied()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the snapshot has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the snapshot holds exactly the records of `dataset`,
    /// compared per field and independent of order.
    pub fn mirrors(&self, dataset: &Dataset) -> bool {
        if self.records.len() != dataset.len() {
            return false;
        }
        dataset.records().iter().all(|r| {
            self.records
                .get(&r.id())
                .is_some_and(|s| s.same_content(r, &self.schema))
        })
    }
}

#[cfg(test)]
#[path = "record_test.rs"]
mod tests;
