use super::*;
use sf_core::Field;

fn schema() -> Schema {
    Schema::new(
        vec![
            Field::required("PassengerId", FieldType::Integer),
            Field::required("Name", FieldType::Text),
            Field::nullable("Fare_norm", FieldType::scaled(2)),
        ],
        "PassengerId",
    )
    .unwrap()
}

#[test]
fn test_quote_ident_escapes_quotes() {
    assert_eq!(quote_ident("Age_norm"), r#""Age_norm""#);
    assert_eq!(quote_ident(r#"a"b"#), r#""a""b""#);
}

#[test]
fn test_split_qualified_name() {
    assert_eq!(split_qualified_name("titanic"), ("main", "titanic"));
    assert_eq!(split_qualified_name("etl.titanic"), ("etl", "titanic"));
}

#[test]
fn test_create_table() {
    assert_eq!(
        create_table("titanic", &schema()),
        "CREATE TABLE \"titanic\" (\"PassengerId\" BIGINT PRIMARY KEY, \
         \"Name\" VARCHAR NOT NULL, \"Fare_norm\" DOUBLE)"
    );
}

#[test]
fn test_select_all_orders_by_identifier() {
    assert_eq!(
        select_all("etl.titanic", &schema()),
        r#"SELECT "PassengerId", "Name", "Fare_norm" FROM "etl"."titanic" ORDER BY "PassengerId""#
    );
}

#[test]
fn test_insert_row() {
    assert_eq!(
        insert_row("titanic", &schema()),
        r#"INSERT INTO "titanic" ("PassengerId", "Name", "Fare_norm") VALUES (?, ?, ?)"#
    );
}

#[test]
fn test_update_row_sets_every_value_field() {
    assert_eq!(
        update_row("titanic", &schema()),
        r#"UPDATE "titanic" SET "Name" = ?, "Fare_norm" = ? WHERE "PassengerId" = ?"#
    );
}

#[test]
fn test_delete_ids() {
    assert_eq!(
        delete_ids("titanic", &schema(), 3),
        r#"DELETE FROM "titanic" WHERE "PassengerId" IN (?, ?, ?)"#
    );
}

#[test]
fn test_column_types() {
    assert_eq!(column_type(FieldType::Integer), "BIGINT");
    assert_eq!(column_type(FieldType::scaled(2)), "DOUBLE");
    assert_eq!(column_type(FieldType::Text), "VARCHAR");
}
