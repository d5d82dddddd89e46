//! Declared record schema shared by the transform stage, the store adapter,
//! and the diff engine.
//!
//! A [`Schema`] is an ordered list of typed fields plus the index of the
//! identifier field. Every [`Record`](crate::record::Record) stores its
//! values in schema order, so positional access is the only access path.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Declared type of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// 64-bit signed integer
    Integer,
    /// 64-bit float, optionally canonicalized to `scale` decimal places
    Float {
        #[serde(default)]
        scale: Option<u32>,
    },
    /// UTF-8 text
    Text,
}

impl FieldType {
    /// Float without a declared scale
    pub const fn float() -> Self {
        FieldType::Float { scale: None }
    }

    /// Float canonicalized to `scale` decimal places
    pub const fn scaled(scale: u32) -> Self {
        FieldType::Float { scale: Some(scale) }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Integer => write!(f, "integer"),
            FieldType::Float { scale: None } => write!(f, "float"),
            FieldType::Float { scale: Some(s) } => write!(f, "float({})", s),
            FieldType::Text => write!(f, "text"),
        }
    }
}

/// One named, typed column of the record schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub nullable: bool,
}

impl Field {
    /// A non-nullable field
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: false,
        }
    }

    /// A nullable field
    pub fn nullable(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: true,
        }
    }
}

/// Ordered field list with a designated identifier field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    fields: Vec<Field>,
    id_index: usize,
}

impl Schema {
    /// Build a schema, validating field names and the identifier field.
    ///
    /// The identifier must be a non-nullable `Integer` field. Field names
    /// are unique case-insensitively because the store folds identifier case.
    pub fn new(fields: Vec<Field>, id_field: &str) -> CoreResult<Self> {
        if fields.is_empty() {
            return Err(CoreError::InvalidSchema {
                message: "schema must declare at least one field".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for field in &fields {
            if field.name.is_empty() {
                return Err(CoreError::InvalidSchema {
                    message: "field names cannot be empty".to_string(),
                });
            }
            if !seen.insert(field.name.to_lowercase()) {
                return Err(CoreError::InvalidSchema {
                    message: format!("duplicate field name '{}'", field.name),
                });
            }
        }

        let id_index = fields
            .iter()
            .position(|f| f.name == id_field)
            .ok_or_else(|| CoreError::InvalidSchema {
                message: format!("identifier field '{}' is not declared", id_field),
            })?;

        let id = &fields[id_index];
        if id.field_type != FieldType::Integer || id.nullable {
            return Err(CoreError::InvalidSchema {
                message: format!(
                    "identifier field '{}' must be a non-nullable integer, found {}{}",
                    id.name,
                    id.field_type,
                    if id.nullable { " (nullable)" } else { "" }
                ),
            });
        }

        Ok(Self { fields, id_index })
    }

    /// All fields in declaration order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false for a validated schema
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of the identifier field
    pub fn id_index(&self) -> usize {
        self.id_index
    }

    /// The identifier field
    pub fn id_field(&self) -> &Field {
        &self.fields[self.id_index]
    }

    /// Look up a field position by exact name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Fields other than the identifier, with their positions
    pub fn value_fields(&self) -> impl Iterator<Item = (usize, &Field)> {
        let id_index = self.id_index;
        self.fields
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != id_index)
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;
