use super::*;
use sf_core::{compute_diff, Dataset, Field, FieldType, Record, Schema, StoreSnapshot, Value};
use std::sync::Arc;

fn schema() -> Arc<Schema> {
    Arc::new(
        Schema::new(
            vec![
                Field::required("PassengerId", FieldType::Integer),
                Field::nullable("Fare_norm", FieldType::scaled(2)),
            ],
            "PassengerId",
        )
        .unwrap(),
    )
}

fn records(schema: &Schema, rows: &[(i64, f64)]) -> Vec<Record> {
    rows.iter()
        .map(|(id, fare)| {
            Record::from_values(schema, vec![Value::from(*id), Value::from(*fare)]).unwrap()
        })
        .collect()
}

fn preview(stored: &[(i64, f64)], fresh: &[(i64, f64)]) -> (Dataset, Preview) {
    let schema = schema();
    let snapshot = StoreSnapshot::new(schema.clone(), records(&schema, stored)).unwrap();
    let dataset = Dataset::new(schema.clone(), records(&schema, fresh));
    let diff = compute_diff(&dataset, &snapshot).unwrap();
    (
        dataset,
        Preview {
            bootstrap: false,
            snapshot,
            diff,
        },
    )
}

#[test]
fn test_report_partitions_ids() {
    let (dataset, preview) = preview(
        &[(1, 0.2), (2, 0.5), (3, 0.9)],
        &[(1, 0.35), (3, 0.9), (4, 0.1)],
    );
    let report = build_report("titanic", dataset.len(), &preview, false);

    assert_eq!(report.records, 3);
    assert_eq!(report.insert_ids, vec![4]);
    assert_eq!(report.update_ids, vec![1]);
    assert_eq!(report.delete_ids, vec![2]);
    assert_eq!((report.inserted, report.updated, report.deleted), (1, 1, 1));
    assert!(report.changes.is_none());
}

#[test]
fn test_report_lists_changed_fields() {
    let (dataset, preview) = preview(&[(1, 0.2)], &[(1, 0.35)]);
    let report = build_report("titanic", dataset.len(), &preview, true);

    let changes = report.changes.unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].id, 1);
    assert_eq!(
        changes[0].fields,
        vec![FieldChange {
            field: "Fare_norm".to_string(),
            old: Value::Float(0.2),
            new: Value::Float(0.35),
        }]
    );
}

#[test]
fn test_report_json_omits_changes_without_fields_flag() {
    let (dataset, preview) = preview(&[], &[(7, 0.5)]);
    let report = build_report("titanic", dataset.len(), &preview, false);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["insert_ids"], serde_json::json!([7]));
    assert!(json.get("changes").is_none());
}
