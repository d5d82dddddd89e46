//! DuckDB store implementation

use crate::error::{DbError, DbResult};
use crate::sql;
use crate::traits::{ApplyPhase, RecordStore, StoreConnector};
use async_trait::async_trait;
use duckdb::types::Value as DuckValue;
use duckdb::Connection;
use sf_core::{Dataset, Diff, DiffSummary, Record, RecordId, Schema, StoreSnapshot, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Identifiers bound per `DELETE ... IN (...)` statement
const DELETE_CHUNK: usize = 512;

const MEMORY_PATH: &str = ":memory:";

/// DuckDB-backed record store for one table
pub struct DuckDbStore {
    conn: Mutex<Connection>,
    table: String,
    #[cfg(any(test, feature = "test-support"))]
    failpoint: Option<ApplyPhase>,
}

impl DuckDbStore {
    fn from_connection(conn: Connection, table: &str) -> Self {
        Self {
            conn: Mutex::new(conn),
            table: table.to_string(),
            #[cfg(any(test, feature = "test-support"))]
            failpoint: None,
        }
    }

    /// Create a store over a new in-memory DuckDB database
    pub fn in_memory(table: &str) -> DbResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DbError::StorageUnavailable(e.to_string()))?;
        Ok(Self::from_connection(conn, table))
    }

    /// Create a store over a DuckDB file
    pub fn from_path(path: &Path, table: &str) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::StorageUnavailable(format!("{}: {}", e, path.display())))?;
        Ok(Self::from_connection(conn, table))
    }

    /// Force the named write phase to fail after its first statement.
    #[cfg(any(test, feature = "test-support"))]
    pub fn with_failpoint(mut self, phase: ApplyPhase) -> Self {
        self.failpoint = Some(phase);
        self
    }

    #[cfg(any(test, feature = "test-support"))]
    fn check_failpoint(&self, phase: ApplyPhase) -> DbResult<()> {
        if self.failpoint == Some(phase) {
            return Err(DbError::aborted(phase, "injected failure"));
        }
        Ok(())
    }

    #[cfg(not(any(test, feature = "test-support")))]
    fn check_failpoint(&self, _phase: ApplyPhase) -> DbResult<()> {
        Ok(())
    }

    /// Table this store manages
    pub fn table(&self) -> &str {
        &self.table
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Run a read-only query and return column names plus rows rendered as strings.
    pub fn query_rows(&self, sql: &str) -> DbResult<(Vec<String>, Vec<Vec<String>>)> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows: Vec<Vec<String>> = stmt
            .query_map([], |row| {
                let col_count = row.as_ref().column_count();
                Ok((0..col_count).map(|i| column_as_string(row, i)).collect())
            })?
            .collect::<Result<Vec<_>, _>>()?;

        // Column metadata is only reliable after the statement has executed.
        let names = (0..stmt.column_count())
            .map(|i| stmt.column_name(i).map_or("?".to_string(), |v| v.to_string()))
            .collect();
        Ok((names, rows))
    }

    /// Execute `body` within a `BEGIN` / `COMMIT` transaction, rolling back on
    /// error.
    fn transaction<F, T>(&self, conn: &Connection, body: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::StorageUnavailable(format!("BEGIN failed: {e}")))?;

        match body(conn) {
            Ok(value) => {
                if let Err(commit_err) = self
                    .check_failpoint(ApplyPhase::Commit)
                    .and_then(|_| conn.execute_batch("COMMIT").map_err(DbError::from))
                {
                    if let Err(rollback_err) = conn.execute_batch("ROLLBACK") {
                        log::error!("ROLLBACK after failed COMMIT failed: {rollback_err}");
                    }
                    return Err(DbError::aborted(ApplyPhase::Commit, commit_err));
                }
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = conn.execute_batch("ROLLBACK") {
                    log::error!("ROLLBACK failed on {}: {rollback_err}", self.table);
                }
                Err(e)
            }
        }
    }

    fn table_exists_sync(&self, conn: &Connection) -> DbResult<bool> {
        let (schema, table) = sql::split_qualified_name(&self.table);
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema = ? AND table_name = ?",
                duckdb::params![schema, table],
                |row| row.get(0),
            )
            .map_err(|e| DbError::StorageUnavailable(e.to_string()))?;
        Ok(count > 0)
    }

    /// Compare persisted column names and types against the declared schema.
    fn verify_columns(&self, conn: &Connection, schema: &Schema) -> DbResult<()> {
        let (schema_name, table) = sql::split_qualified_name(&self.table);
        let mut stmt = conn.prepare(
            "SELECT column_name, data_type FROM information_schema.columns \
             WHERE table_schema = ? AND table_name = ? ORDER BY ordinal_position",
        )?;
        let columns: Vec<(String, String)> = stmt
            .query_map(duckdb::params![schema_name, table], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if columns.is_empty() {
            return Err(DbError::TableNotFound(self.table.clone()));
        }

        let mismatch = |message: String| DbError::SchemaMismatch {
            table: self.table.clone(),
            message,
        };

        if columns.len() != schema.len() {
            return Err(mismatch(format!(
                "expected {} columns [{}], found {} [{}]",
                schema.len(),
                schema.field_names().join(", "),
                columns.len(),
                columns
                    .iter()
                    .map(|(n, _)| n.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        for ((name, data_type), field) in columns.iter().zip(schema.fields()) {
            if !name.eq_ignore_ascii_case(&field.name) {
                return Err(mismatch(format!(
                    "expected column '{}', found '{}'",
                    field.name, name
                )));
            }
            let expected = sql::column_type(field.field_type);
            if !data_type.eq_ignore_ascii_case(expected) {
                return Err(mismatch(format!(
                    "column '{}' has type {}, expected {}",
                    name, data_type, expected
                )));
            }
        }
        Ok(())
    }

    fn insert_records(
        &self,
        conn: &Connection,
        schema: &Schema,
        records: &[Record],
        phase: ApplyPhase,
    ) -> DbResult<usize> {
        let mut stmt = conn
            .prepare(&sql::insert_row(&self.table, schema))
            .map_err(|e| DbError::aborted(phase, e))?;
        for (n, record) in records.iter().enumerate() {
            let params: Vec<DuckValue> = record.values().iter().map(encode).collect();
            stmt.execute(duckdb::params_from_iter(params))
                .map_err(|e| DbError::aborted(phase, format!("record {}: {}", record.id(), e)))?;
            if n == 0 {
                self.check_failpoint(phase)?;
            }
        }
        Ok(records.len())
    }

    fn update_records(
        &self,
        conn: &Connection,
        schema: &Schema,
        records: &[Record],
    ) -> DbResult<usize> {
        let phase = ApplyPhase::Update;
        let mut stmt = conn
            .prepare(&sql::update_row(&self.table, schema))
            .map_err(|e| DbError::aborted(phase, e))?;
        let id_index = schema.id_index();
        for (n, record) in records.iter().enumerate() {
            let mut params: Vec<DuckValue> = record
                .values()
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != id_index)
                .map(|(_, v)| encode(v))
                .collect();
            params.push(DuckValue::BigInt(record.id().0));
            let affected = stmt
                .execute(duckdb::params_from_iter(params))
                .map_err(|e| DbError::aborted(phase, format!("record {}: {}", record.id(), e)))?;
            if affected != 1 {
                return Err(DbError::aborted(
                    phase,
                    format!("record {} matched {} rows, expected 1", record.id(), affected),
                ));
            }
            if n == 0 {
                self.check_failpoint(phase)?;
            }
        }
        Ok(records.len())
    }

    fn delete_records(
        &self,
        conn: &Connection,
        schema: &Schema,
        ids: &[RecordId],
    ) -> DbResult<usize> {
        let phase = ApplyPhase::Delete;
        let mut deleted = 0;
        for chunk in ids.chunks(DELETE_CHUNK) {
            let params: Vec<DuckValue> = chunk.iter().map(|id| DuckValue::BigInt(id.0)).collect();
            let affected = conn
                .execute(
                    &sql::delete_ids(&self.table, schema, chunk.len()),
                    duckdb::params_from_iter(params),
                )
                .map_err(|e| DbError::aborted(phase, e))?;
            if affected != chunk.len() {
                return Err(DbError::aborted(
                    phase,
                    format!("deleted {} rows, expected {}", affected, chunk.len()),
                ));
            }
            deleted += affected;
            self.check_failpoint(phase)?;
        }
        Ok(deleted)
    }

    fn decode_row(&self, schema: &Schema, raw: Vec<DuckValue>) -> DbResult<Record> {
        let values = raw
            .into_iter()
            .zip(schema.fields())
            .map(|(v, field)| {
                decode(v).map_err(|msg| {
                    DbError::InvalidData(format!("column '{}': {}", field.name, msg))
                })
            })
            .collect::<DbResult<Vec<_>>>()?;
        Record::from_values(schema, values).map_err(|e| DbError::InvalidData(e.to_string()))
    }
}

/// Bind a record value as a DuckDB parameter
fn encode(value: &Value) -> DuckValue {
    match value {
        Value::Null => DuckValue::Null,
        Value::Integer(i) => DuckValue::BigInt(*i),
        Value::Float(f) => DuckValue::Double(*f),
        Value::Text(s) => DuckValue::Text(s.clone()),
    }
}

/// Decode a stored DuckDB value; any integer width becomes `Integer`,
/// any float width becomes `Float`.
fn decode(value: DuckValue) -> Result<Value, String> {
    let out_of_range = |v: String| format!("integer {} out of range", v);
    Ok(match value {
        DuckValue::Null => Value::Null,
        DuckValue::TinyInt(i) => Value::Integer(i.into()),
        DuckValue::SmallInt(i) => Value::Integer(i.into()),
        DuckValue::Int(i) => Value::Integer(i.into()),
        DuckValue::BigInt(i) => Value::Integer(i),
        DuckValue::HugeInt(i) => {
            Value::Integer(i64::try_from(i).map_err(|_| out_of_range(i.to_string()))?)
        }
        DuckValue::UTinyInt(i) => Value::Integer(i.into()),
        DuckValue::USmallInt(i) => Value::Integer(i.into()),
        DuckValue::UInt(i) => Value::Integer(i.into()),
        DuckValue::UBigInt(i) => {
            Value::Integer(i64::try_from(i).map_err(|_| out_of_range(i.to_string()))?)
        }
        DuckValue::Float(f) => Value::Float(f.into()),
        DuckValue::Double(f) => Value::Float(f),
        DuckValue::Text(s) => Value::Text(s),
        other => return Err(format!("unsupported stored value {:?}", other)),
    })
}

/// Render a column value as a String.
///
/// Values go through the same decoding as snapshot rows; anything else
/// falls back to its debug form.
fn column_as_string(row: &duckdb::Row<'_>, idx: usize) -> String {
    let raw = match row.get::<_, DuckValue>(idx) {
        Ok(raw) => raw,
        Err(_) => return "null".to_string(),
    };
    match decode(raw.clone()) {
        Ok(Value::Null) => "null".to_string(),
        Ok(Value::Integer(i)) => i.to_string(),
        Ok(Value::Float(f)) => f.to_string(),
        Ok(Value::Text(s)) => s,
        Err(_) => format!("{:?}", raw),
    }
}

#[async_trait]
impl RecordStore for DuckDbStore {
    async fn table_exists(&self) -> DbResult<bool> {
        let conn = self.lock()?;
        self.table_exists_sync(&conn)
    }

    async fn create_and_load(&self, dataset: &Dataset) -> DbResult<usize> {
        let conn = self.lock()?;
        let schema = dataset.schema();
        let phase = ApplyPhase::Load;
        self.transaction(&conn, |conn| {
            let (schema_name, _) = sql::split_qualified_name(&self.table);
            if self.table.contains('.') {
                conn.execute_batch(&format!(
                    "CREATE SCHEMA IF NOT EXISTS {}",
                    sql::quote_ident(schema_name)
                ))
                .map_err(|e| DbError::aborted(phase, e))?;
            }
            conn.execute_batch(&sql::create_table(&self.table, schema))
                .map_err(|e| DbError::aborted(phase, e))?;
            self.insert_records(conn, schema, dataset.records(), phase)
        })
    }

    async fn read_snapshot(&self, schema: &Arc<Schema>) -> DbResult<StoreSnapshot> {
        let conn = self.lock()?;
        self.verify_columns(&conn, schema)?;

        let width = schema.len();
        let mut stmt = conn.prepare(&sql::select_all(&self.table, schema))?;
        let raw_rows: Vec<Vec<DuckValue>> = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get::<_, DuckValue>(i))
                    .collect::<Result<Vec<_>, _>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let records = raw_rows
            .into_iter()
            .map(|raw| self.decode_row(schema, raw))
            .collect::<DbResult<Vec<_>>>()?;

        StoreSnapshot::new(Arc::clone(schema), records)
            .map_err(|e| DbError::InvalidData(e.to_string()))
    }

    async fn apply_diff(&self, schema: &Schema, diff: &Diff) -> DbResult<DiffSummary> {
        if diff.is_empty() {
            return Ok(DiffSummary::default());
        }

        let conn = self.lock()?;
        self.transaction(&conn, |conn| {
            let mut summary = DiffSummary::default();
            if !diff.to_delete.is_empty() {
                summary.deleted = self.delete_records(conn, schema, &diff.to_delete)?;
            }
            if !diff.to_update.is_empty() {
                summary.updated = self.update_records(conn, schema, &diff.to_update)?;
            }
            if !diff.to_insert.is_empty() {
                summary.inserted =
                    self.insert_records(conn, schema, &diff.to_insert, ApplyPhase::Insert)?;
            }
            Ok(summary)
        })
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

enum Target {
    File(PathBuf),
    /// Root connection kept open so every handle shares one in-memory database
    Memory(Mutex<Connection>),
}

/// Opens a fresh [`DuckDbStore`] per run
pub struct DuckDbConnector {
    target: Target,
    table: String,
    #[cfg(any(test, feature = "test-support"))]
    failpoint: Option<ApplyPhase>,
}

impl DuckDbConnector {
    /// Connector for a DuckDB file, or a shared in-memory database for `:memory:`
    pub fn new(path: &str, table: &str) -> DbResult<Self> {
        let target = if path == MEMORY_PATH {
            let root = Connection::open_in_memory()
                .map_err(|e| DbError::StorageUnavailable(e.to_string()))?;
            Target::Memory(Mutex::new(root))
        } else {
            Target::File(PathBuf::from(path))
        };
        Ok(Self {
            target,
            table: table.to_string(),
            #[cfg(any(test, feature = "test-support"))]
            failpoint: None,
        })
    }

    /// Every store handed out fails at `phase`
    #[cfg(any(test, feature = "test-support"))]
    pub fn with_failpoint(mut self, phase: ApplyPhase) -> Self {
        self.failpoint = Some(phase);
        self
    }

    /// Open a concrete store handle
    pub fn open(&self) -> DbResult<DuckDbStore> {
        #[allow(unused_mut)]
        let mut store = match &self.target {
            Target::File(path) => DuckDbStore::from_path(path, &self.table)?,
            Target::Memory(root) => {
                let conn = root
                    .lock()
                    .map_err(|e| DbError::MutexPoisoned(e.to_string()))?
                    .try_clone()
                    .map_err(|e| DbError::StorageUnavailable(e.to_string()))?;
                DuckDbStore::from_connection(conn, &self.table)
            }
        };
        #[cfg(any(test, feature = "test-support"))]
        {
            store.failpoint = self.failpoint;
        }
        Ok(store)
    }
}

impl StoreConnector for DuckDbConnector {
    fn connect(&self) -> DbResult<Box<dyn RecordStore>> {
        Ok(Box::new(self.open()?))
    }

    fn describe(&self) -> String {
        match &self.target {
            Target::File(path) => format!("duckdb:{}#{}", path.display(), self.table),
            Target::Memory(_) => format!("duckdb::memory:#{}", self.table),
        }
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
