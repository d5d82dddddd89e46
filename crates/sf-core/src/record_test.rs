use super::*;
use crate::schema::{Field, FieldType};

fn schema() -> Arc<Schema> {
    Arc::new(
        Schema::new(
            vec![
                Field::required("id", FieldType::Integer),
                Field::required("sex", FieldType::Text),
                Field::nullable("fare_norm", FieldType::scaled(2)),
            ],
            "id",
        )
        .unwrap(),
    )
}

fn row(id: i64, sex: &str, fare: Option<f64>) -> Vec<Value> {
    vec![Value::Integer(id), Value::from(sex), Value::from(fare)]
}

#[test]
fn test_record_from_values_coerces_integers_into_float_fields() {
    let schema = schema();
    let record =
        Record::from_values(&schema, vec![1.into(), "male".into(), Value::Integer(1)]).unwrap();
    assert_eq!(record.id(), RecordId(1));
    assert_eq!(record.value(2), Some(&Value::Float(1.0)));
    assert_eq!(record.get(&schema, "sex"), Some(&Value::from("male")));
}

#[test]
fn test_record_from_values_rejects_wrong_arity() {
    let err = Record::from_values(&schema(), vec![1.into()]).unwrap_err();
    assert!(err.to_string().contains("expected 3 values"));
}

#[test]
fn test_record_from_values_rejects_null_in_required_field() {
    let err = Record::from_values(&schema(), vec![1.into(), Value::Null, Value::Null]).unwrap_err();
    assert!(err.to_string().contains("'sex' is not nullable"));
}

#[test]
fn test_record_from_values_rejects_type_mismatch() {
    let err =
        Record::from_values(&schema(), vec![1.into(), Value::Integer(0), Value::Null]).unwrap_err();
    assert!(matches!(err, CoreError::SchemaViolation { .. }));
    assert!(err.to_string().contains("expects text"));
}

#[test]
fn test_same_content_ignores_float_noise() {
    let schema = schema();
    let a = Record::from_values(&schema, row(1, "female", Some(0.3))).unwrap();
    let b = Record::from_values(&schema, row(1, "female", Some(0.1 + 0.2))).unwrap();
    assert!(a.same_content(&b, &schema));
    assert_eq!(a.checksum(&schema), b.checksum(&schema));
}

#[test]
fn test_same_content_detects_single_field_change() {
    let schema = schema();
    let a = Record::from_values(&schema, row(1, "female", Some(0.20))).unwrap();
    let b = Record::from_values(&schema, row(1, "female", Some(0.35))).unwrap();
    assert!(!a.same_content(&b, &schema));
    assert_ne!(a.checksum(&schema), b.checksum(&schema));
}

#[test]
fn test_dataset_index_by_id_reports_duplicates() {
    let schema = schema();
    let dataset = Dataset::from_rows(
        schema,
        vec![row(1, "male", None), row(2, "male", None), row(1, "female", None)],
    )
    .unwrap();
    let err = dataset.index_by_id().unwrap_err();
    assert!(matches!(
        err,
        CoreError::DuplicateIdentifier {
            id: RecordId(1),
            origin: "dataset"
        }
    ));
}

#[test]
fn test_dataset_fingerprint_is_order_independent() {
    let schema = schema();
    let a = Dataset::from_rows(
        schema.clone(),
        vec![row(1, "male", Some(0.1)), row(2, "female", None)],
    )
    .unwrap();
    let b = Dataset::from_rows(
        schema.clone(),
        vec![row(2, "female", None), row(1, "male", Some(0.1))],
    )
    .unwrap();
    let c = Dataset::from_rows(schema, vec![row(1, "male", Some(0.2))]).unwrap();
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.fingerprint(), c.fingerprint());
}

#[test]
fn test_snapshot_orders_by_identifier() {
    let schema = schema();
    let records = vec![
        Record::from_values(&schema, row(3, "male", None)).unwrap(),
        Record::from_values(&schema, row(1, "male", None)).unwrap(),
        Record::from_values(&schema, row(2, "male", None)).unwrap(),
    ];
    let snapshot = StoreSnapshot::new(schema, records).unwrap();
    let ids: Vec<_> = snapshot.ids().map(|id| id.0).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn test_snapshot_rejects_duplicates() {
    let schema = schema();
    let records = vec![
        Record::from_values(&schema, row(1, "male", None)).unwrap(),
        Record::from_values(&schema, row(1, "male", None)).unwrap(),
    ];
    assert!(StoreSnapshot::new(schema, records).is_err());
}

#[test]
fn test_snapshot_mirrors_dataset() {
    let schema = schema();
    let dataset = Dataset::from_rows(
        schema.clone(),
        vec![row(2, "male", Some(0.1)), row(1, "female", None)],
    )
    .unwrap();
    let snapshot = StoreSnapshot::new(schema.clone(), dataset.records().to_vec()).unwrap();
    assert!(snapshot.mirrors(&dataset));
    assert!(!StoreSnapshot::empty(schema).mirrors(&dataset));
}
