//! Field values and the per-field equality rule used by reconciliation.

use crate::schema::FieldType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

/// Round to `places` decimals using round-half-to-even.
///
/// This is the rounding applied by the transform stage; reconciliation
/// reuses it so a value read back from the store canonicalizes identically.
pub fn round_to(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(places as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round_ties_even() / factor
}

/// Canonical float: collapses `-0.0` into `0.0` and every NaN into one NaN.
fn canonical_float(value: f64, scale: Option<u32>) -> f64 {
    let v = match scale {
        Some(places) => round_to(value, places),
        None => value,
    };
    if v.is_nan() {
        f64::NAN
    } else if v == 0.0 {
        0.0
    } else {
        v
    }
}

impl Value {
    /// Whether this value is `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value, if any
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Integer view of the value, if any
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Convert the value into the representation declared by `field_type`.
    ///
    /// Integers widen into floats for float fields; floats with an integral
    /// value narrow into integers for integer fields. Returns `None` when the
    /// value cannot represent the type.
    pub fn coerce(self, field_type: FieldType) -> Option<Value> {
        match (self, field_type) {
            (Value::Null, _) => Some(Value::Null),
            (Value::Integer(i), FieldType::Integer) => Some(Value::Integer(i)),
            (Value::Float(f), FieldType::Integer) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    Some(Value::Integer(f as i64))
                } else {
                    None
                }
            }
            (Value::Integer(i), FieldType::Float { .. }) => Some(Value::Float(i as f64)),
            (Value::Float(f), FieldType::Float { .. }) => Some(Value::Float(f)),
            (Value::Text(s), FieldType::Text) => Some(Value::Text(s)),
            _ => None,
        }
    }

    /// Per-field equality under the declared type.
    ///
    /// Floats are compared after canonicalization (scale rounding, signed
    /// zero, NaN) so storage round-trips never register as a change. Every
    /// other comparison is exact.
    pub fn canonical_eq(&self, other: &Value, field_type: FieldType) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (a, b) => match (a.as_f64(), b.as_f64(), field_type) {
                (Some(x), Some(y), FieldType::Float { scale }) => {
                    let (x, y) = (canonical_float(x, scale), canonical_float(y, scale));
                    (x.is_nan() && y.is_nan()) || x == y
                }
                _ => false,
            },
        }
    }

    /// Stable textual encoding used for content checksums.
    ///
    /// Two values that are `canonical_eq` under `field_type` always encode
    /// identically.
    pub fn canonical_encoding(&self, field_type: FieldType) -> String {
        match self {
            Value::Null => "n".to_string(),
            Value::Text(s) => format!("t{}:{}", s.len(), s),
            Value::Integer(i) if field_type == FieldType::Integer => format!("i{}", i),
            Value::Integer(_) | Value::Float(_) => {
                let scale = match field_type {
                    FieldType::Float { scale } => scale,
                    _ => None,
                };
                let c = canonical_float(self.as_f64().unwrap_or(f64::NAN), scale);
                match scale {
                    Some(places) if c.is_finite() => format!("f{:.*}", places as usize, c),
                    _ => format!("f{}", c),
                }
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
#[path = "value_test.rs"]
mod tests;
