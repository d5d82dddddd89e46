use super::*;
use sf_core::{compute_diff, Field, FieldType};

fn schema() -> Arc<Schema> {
    Arc::new(
        Schema::new(
            vec![
                Field::required("id", FieldType::Integer),
                Field::required("name", FieldType::Text),
                Field::nullable("score", FieldType::scaled(2)),
            ],
            "id",
        )
        .unwrap(),
    )
}

fn dataset(rows: &[(i64, &str, Option<f64>)]) -> Dataset {
    Dataset::from_rows(
        schema(),
        rows.iter()
            .map(|(id, name, score)| {
                vec![Value::from(*id), Value::from(*name), Value::from(*score)]
            })
            .collect(),
    )
    .unwrap()
}

async fn loaded_store(rows: &[(i64, &str, Option<f64>)]) -> DuckDbStore {
    let store = DuckDbStore::in_memory("items").unwrap();
    store.create_and_load(&dataset(rows)).await.unwrap();
    store
}

#[tokio::test]
async fn test_table_exists_before_and_after_load() {
    let store = DuckDbStore::in_memory("items").unwrap();
    assert_eq!(store.db_type(), "duckdb");
    assert!(!store.table_exists().await.unwrap());

    let loaded = store.create_and_load(&dataset(&[(1, "a", Some(1.0))])).await.unwrap();
    assert_eq!(loaded, 1);
    assert!(store.table_exists().await.unwrap());
}

#[tokio::test]
async fn test_create_and_load_empty_dataset_creates_table() {
    let store = DuckDbStore::in_memory("items").unwrap();
    assert_eq!(store.create_and_load(&dataset(&[])).await.unwrap(), 0);
    assert!(store.table_exists().await.unwrap());
    assert!(store.read_snapshot(&schema()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_and_load_qualified_table() {
    let store = DuckDbStore::in_memory("etl.items").unwrap();
    store.create_and_load(&dataset(&[(1, "a", None)])).await.unwrap();
    assert!(store.table_exists().await.unwrap());
    assert_eq!(store.read_snapshot(&schema()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_snapshot_round_trips_values() {
    let store = loaded_store(&[(3, "c", None), (1, "a", Some(0.25)), (2, "b", Some(7.0))]).await;
    let snapshot = store.read_snapshot(&schema()).await.unwrap();

    assert_eq!(
        snapshot.ids().collect::<Vec<_>>(),
        vec![RecordId(1), RecordId(2), RecordId(3)]
    );
    assert!(snapshot.mirrors(&dataset(&[
        (1, "a", Some(0.25)),
        (2, "b", Some(7.0)),
        (3, "c", None),
    ])));
    assert_eq!(snapshot.get(RecordId(3)).unwrap().value(2), Some(&Value::Null));
}

#[tokio::test]
async fn test_failed_load_leaves_no_table() {
    let store = DuckDbStore::in_memory("items")
        .unwrap()
        .with_failpoint(ApplyPhase::Load);
    let err = store
        .create_and_load(&dataset(&[(1, "a", None), (2, "b", None)]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DbError::TransactionAborted { phase: ApplyPhase::Load, .. }
    ));
    assert!(!store.table_exists().await.unwrap());
}

#[tokio::test]
async fn test_read_snapshot_missing_table() {
    let store = DuckDbStore::in_memory("items").unwrap();
    let err = store.read_snapshot(&schema()).await.unwrap_err();
    assert!(matches!(err, DbError::TableNotFound(_)));
}

#[tokio::test]
async fn test_read_snapshot_schema_mismatch() {
    let store = DuckDbStore::in_memory("items").unwrap();
    {
        let conn = store.lock().unwrap();
        conn.execute_batch(r#"CREATE TABLE "items" ("id" BIGINT PRIMARY KEY, "name" VARCHAR)"#)
            .unwrap();
    }
    let err = store.read_snapshot(&schema()).await.unwrap_err();
    assert!(matches!(err, DbError::SchemaMismatch { .. }), "got {err}");
}

#[tokio::test]
async fn test_read_snapshot_column_type_mismatch() {
    let store = DuckDbStore::in_memory("items").unwrap();
    {
        let conn = store.lock().unwrap();
        conn.execute_batch(
            r#"CREATE TABLE "items" ("id" BIGINT PRIMARY KEY, "name" VARCHAR, "score" VARCHAR)"#,
        )
        .unwrap();
    }
    let err = store.read_snapshot(&schema()).await.unwrap_err();
    match err {
        DbError::SchemaMismatch { message, .. } => assert!(message.contains("score")),
        other => panic!("expected SchemaMismatch, got {other}"),
    }
}

#[tokio::test]
async fn test_apply_diff_updates_inserts_and_deletes() {
    let store = loaded_store(&[(1, "a", Some(1.0)), (2, "b", Some(2.0)), (3, "c", None)]).await;
    let target = dataset(&[(1, "a", Some(1.0)), (2, "b2", Some(2.5)), (4, "d", None)]);

    let snapshot = store.read_snapshot(&schema()).await.unwrap();
    let diff = compute_diff(&target, &snapshot).unwrap();
    let summary = store.apply_diff(&schema(), &diff).await.unwrap();

    assert_eq!(
        summary,
        DiffSummary {
            inserted: 1,
            updated: 1,
            deleted: 1
        }
    );
    assert!(store.read_snapshot(&schema()).await.unwrap().mirrors(&target));
}

#[tokio::test]
async fn test_apply_empty_diff_is_noop() {
    let store = loaded_store(&[(1, "a", None)]).await;
    let summary = store.apply_diff(&schema(), &Diff::default()).await.unwrap();
    assert_eq!(summary.total(), 0);
    assert_eq!(store.read_snapshot(&schema()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_failure_in_any_phase_rolls_back_everything() {
    for phase in [
        ApplyPhase::Delete,
        ApplyPhase::Update,
        ApplyPhase::Insert,
        ApplyPhase::Commit,
    ] {
        let initial = [(1, "a", Some(1.0)), (2, "b", Some(2.0)), (3, "c", None)];
        let store = loaded_store(&initial).await.with_failpoint(phase);
        let target = dataset(&[
            (2, "changed", Some(9.0)),
            (3, "c", None),
            (5, "e", None),
            (6, "f", None),
        ]);

        let before = store.read_snapshot(&schema()).await.unwrap();
        let diff = compute_diff(&target, &before).unwrap();
        let err = store.apply_diff(&schema(), &diff).await.unwrap_err();
        assert!(
            matches!(err, DbError::TransactionAborted { phase: p, .. } if p == phase),
            "phase {phase}: got {err}"
        );

        let after = store.read_snapshot(&schema()).await.unwrap();
        assert!(after.mirrors(&dataset(&initial)), "phase {phase} left partial writes");
    }
}

#[tokio::test]
async fn test_update_of_missing_row_aborts() {
    let store = loaded_store(&[(1, "a", None)]).await;
    let ghost = dataset(&[(9, "ghost", None)]);
    let diff = Diff {
        to_update: ghost.records().to_vec(),
        ..Diff::default()
    };

    let err = store.apply_diff(&schema(), &diff).await.unwrap_err();
    assert!(matches!(
        err,
        DbError::TransactionAborted { phase: ApplyPhase::Update, .. }
    ));
}

#[tokio::test]
async fn test_delete_spanning_multiple_chunks() {
    let rows: Vec<(i64, String)> = (1..=(DELETE_CHUNK as i64 * 2 + 5))
        .map(|i| (i, format!("n{i}")))
        .collect();
    let initial = Dataset::from_rows(
        schema(),
        rows.iter()
            .map(|(i, n)| vec![Value::from(*i), Value::from(n.as_str()), Value::Null])
            .collect(),
    )
    .unwrap();
    let store = DuckDbStore::in_memory("items").unwrap();
    store.create_and_load(&initial).await.unwrap();

    let snapshot = store.read_snapshot(&schema()).await.unwrap();
    let diff = compute_diff(&dataset(&[(1, "n1", None)]), &snapshot).unwrap();
    let summary = store.apply_diff(&schema(), &diff).await.unwrap();

    assert_eq!(summary.deleted, rows.len() - 1);
    assert_eq!(store.read_snapshot(&schema()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_stored_integer_widens_into_float_field() {
    let store = DuckDbStore::in_memory("items").unwrap();
    {
        let conn = store.lock().unwrap();
        conn.execute_batch(
            r#"CREATE TABLE "items" (
                   "id" BIGINT PRIMARY KEY, "name" VARCHAR NOT NULL, "score" DOUBLE
               );
               INSERT INTO "items" VALUES (1, 'a', 3)"#,
        )
        .unwrap();
    }
    let snapshot = store.read_snapshot(&schema()).await.unwrap();
    assert_eq!(
        snapshot.get(RecordId(1)).unwrap().value(2),
        Some(&Value::Float(3.0))
    );
}

#[tokio::test]
async fn test_query_rows_renders_strings() {
    let store = loaded_store(&[(1, "a", Some(0.5)), (2, "b", None)]).await;
    let (columns, rows) = store
        .query_rows(r#"SELECT "name", "id" FROM "items" ORDER BY "id""#)
        .unwrap();
    assert_eq!(columns, vec!["name", "id"]);
    assert_eq!(rows, vec![vec!["a", "1"], vec!["b", "2"]]);
}

#[tokio::test]
async fn test_memory_connector_shares_database() {
    let connector = DuckDbConnector::new(":memory:", "items").unwrap();
    let first = connector.connect().unwrap();
    first.create_and_load(&dataset(&[(1, "a", None)])).await.unwrap();
    drop(first);

    let second = connector.connect().unwrap();
    assert!(second.table_exists().await.unwrap());
    assert_eq!(second.read_snapshot(&schema()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_file_connector_persists_between_handles() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.duckdb");
    let connector = DuckDbConnector::new(path.to_str().unwrap(), "items").unwrap();

    connector
        .connect()
        .unwrap()
        .create_and_load(&dataset(&[(1, "a", None), (2, "b", None)]))
        .await
        .unwrap();

    let reopened = connector.connect().unwrap();
    assert_eq!(reopened.read_snapshot(&schema()).await.unwrap().len(), 2);
    assert!(connector.describe().contains("items"));
}

#[test]
fn test_unreachable_file_is_storage_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("nested").join("store.duckdb");
    let connector = DuckDbConnector::new(path.to_str().unwrap(), "items").unwrap();
    assert!(matches!(
        connector.connect().err(),
        Some(DbError::StorageUnavailable(_))
    ));
}
