use super::*;

#[test]
fn test_round_to_half_even() {
    assert_eq!(round_to(0.125, 2), 0.12);
    assert_eq!(round_to(0.375, 2), 0.38);
    assert_eq!(round_to(29.699, 2), 29.7);
    assert_eq!(round_to(-1.005, 0), -1.0);
}

#[test]
fn test_round_to_non_finite_passthrough() {
    assert!(round_to(f64::NAN, 2).is_nan());
    assert_eq!(round_to(f64::INFINITY, 2), f64::INFINITY);
}

#[test]
fn test_canonical_eq_scaled_float_ignores_representation_noise() {
    let ty = FieldType::scaled(2);
    let stored = Value::Float(0.3);
    let recomputed = Value::Float(0.1 + 0.2);
    assert_ne!(0.1 + 0.2, 0.3);
    assert!(stored.canonical_eq(&recomputed, ty));
}

#[test]
fn test_canonical_eq_scaled_float_detects_real_change() {
    let ty = FieldType::scaled(2);
    assert!(!Value::Float(0.20).canonical_eq(&Value::Float(0.35), ty));
    assert!(!Value::Float(0.50).canonical_eq(&Value::Float(0.51), ty));
}

#[test]
fn test_canonical_eq_unscaled_float_is_exact() {
    let ty = FieldType::float();
    assert!(Value::Float(71.2833).canonical_eq(&Value::Float(71.2833), ty));
    assert!(!Value::Float(71.2833).canonical_eq(&Value::Float(71.2834), ty));
}

#[test]
fn test_canonical_eq_signed_zero_and_nan() {
    let ty = FieldType::float();
    assert!(Value::Float(0.0).canonical_eq(&Value::Float(-0.0), ty));
    assert!(Value::Float(f64::NAN).canonical_eq(&Value::Float(f64::NAN), ty));
}

#[test]
fn test_canonical_eq_integer_widened_on_float_field() {
    let ty = FieldType::float();
    assert!(Value::Integer(7).canonical_eq(&Value::Float(7.0), ty));
    // On an integer field a float never equals an integer.
    assert!(!Value::Integer(7).canonical_eq(&Value::Float(7.0), FieldType::Integer));
}

#[test]
fn test_canonical_eq_nulls() {
    assert!(Value::Null.canonical_eq(&Value::Null, FieldType::Text));
    assert!(!Value::Null.canonical_eq(&Value::Text(String::new()), FieldType::Text));
    assert!(!Value::Integer(0).canonical_eq(&Value::Null, FieldType::Integer));
}

#[test]
fn test_canonical_eq_text_exact() {
    assert!(Value::from("S").canonical_eq(&Value::from("S"), FieldType::Text));
    assert!(!Value::from("S").canonical_eq(&Value::from("s"), FieldType::Text));
}

#[test]
fn test_coerce() {
    assert_eq!(
        Value::Integer(3).coerce(FieldType::float()),
        Some(Value::Float(3.0))
    );
    assert_eq!(
        Value::Float(3.0).coerce(FieldType::Integer),
        Some(Value::Integer(3))
    );
    assert_eq!(Value::Float(3.5).coerce(FieldType::Integer), None);
    assert_eq!(Value::from("x").coerce(FieldType::Integer), None);
    assert_eq!(Value::Null.coerce(FieldType::Text), Some(Value::Null));
}

#[test]
fn test_canonical_encoding_matches_equality() {
    let ty = FieldType::scaled(2);
    assert_eq!(
        Value::Float(0.3).canonical_encoding(ty),
        Value::Float(0.1 + 0.2).canonical_encoding(ty)
    );
    assert_eq!(
        Value::Integer(1).canonical_encoding(ty),
        Value::Float(1.0).canonical_encoding(ty)
    );
    assert_eq!(Value::Float(0.35).canonical_encoding(ty), "f0.35");
    assert_ne!(
        Value::from("1").canonical_encoding(FieldType::Text),
        Value::Integer(1).canonical_encoding(FieldType::Integer)
    );
}

#[test]
fn test_from_option() {
    assert_eq!(Value::from(None::<i64>), Value::Null);
    assert_eq!(Value::from(Some("C85")), Value::from("C85"));
}
