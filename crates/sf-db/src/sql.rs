//! SQL text for the persisted table
//!
//! Identifiers are always quoted; values are always bound as parameters.

use sf_core::{FieldType, Schema};

/// Quote a SQL identifier to prevent injection.
///
/// Wraps the identifier in double quotes and escapes any embedded double quotes
/// by doubling them, following the SQL standard.
///
/// # Examples
/// ```
/// use sf_db::sql::quote_ident;
/// assert_eq!(quote_ident("titanic"), r#""titanic""#);
/// assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a potentially schema-qualified name (e.g. `schema.table`).
///
/// # Examples
/// ```
/// use sf_db::sql::quote_qualified;
/// assert_eq!(quote_qualified("staging.titanic"), r#""staging"."titanic""#);
/// ```
pub fn quote_qualified(name: &str) -> String {
    name.split('.')
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}

/// Split a potentially schema-qualified table name into (schema, table),
/// defaulting to `main`.
pub fn split_qualified_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) => (&name[..pos], &name[pos + 1..]),
        None => ("main", name),
    }
}

/// DuckDB column type for a declared field type
pub fn column_type(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::Integer => "BIGINT",
        FieldType::Float { .. } => "DOUBLE",
        FieldType::Text => "VARCHAR",
    }
}

/// `CREATE TABLE` for the schema, identifier as primary key
pub fn create_table(table: &str, schema: &Schema) -> String {
    let id_index = schema.id_index();
    let columns: Vec<String> = schema
        .fields()
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let mut col = format!("{} {}", quote_ident(&f.name), column_type(f.field_type));
            if i == id_index {
                col.push_str(" PRIMARY KEY");
            } else if !f.nullable {
                col.push_str(" NOT NULL");
            }
            col
        })
        .collect();
    format!(
        "CREATE TABLE {} ({})",
        quote_qualified(table),
        columns.join(", ")
    )
}

/// Full scan in identifier order, columns in schema order
pub fn select_all(table: &str, schema: &Schema) -> String {
    let columns: Vec<String> = schema.fields().iter().map(|f| quote_ident(&f.name)).collect();
    format!(
        "SELECT {} FROM {} ORDER BY {}",
        columns.join(", "),
        quote_qualified(table),
        quote_ident(&schema.id_field().name)
    )
}

/// Single-row insert with one placeholder per field
pub fn insert_row(table: &str, schema: &Schema) -> String {
    let columns: Vec<String> = schema.fields().iter().map(|f| quote_ident(&f.name)).collect();
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_qualified(table),
        columns.join(", "),
        placeholders
    )
}

/// Whole-record update: every non-identifier field, then the identifier
pub fn update_row(table: &str, schema: &Schema) -> String {
    let assignments: Vec<String> = schema
        .value_fields()
        .map(|(_, f)| format!("{} = ?", quote_ident(&f.name)))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {} = ?",
        quote_qualified(table),
        assignments.join(", "),
        quote_ident(&schema.id_field().name)
    )
}

/// Delete of `count` identifiers in one statement
pub fn delete_ids(table: &str, schema: &Schema, count: usize) -> String {
    let placeholders = vec!["?"; count].join(", ");
    format!(
        "DELETE FROM {} WHERE {} IN ({})",
        quote_qualified(table),
        quote_ident(&schema.id_field().name),
        placeholders
    )
}

#[cfg(test)]
#[path = "sql_test.rs"]
mod tests;
