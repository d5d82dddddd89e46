//! Declared passenger schema shared by the transform stage and the store.

use sf_core::{CoreResult, Field, FieldType, Schema};

pub const PASSENGER_ID: &str = "PassengerId";
pub const SURVIVED: &str = "Survived";
pub const PCLASS: &str = "Pclass";
pub const NAME: &str = "Name";
pub const SEX: &str = "Sex";
pub const AGE: &str = "Age";
pub const SIBSP: &str = "SibSp";
pub const PARCH: &str = "Parch";
pub const TICKET: &str = "Ticket";
pub const FARE: &str = "Fare";
pub const CABIN: &str = "Cabin";
pub const EMBARKED: &str = "Embarked";
pub const AGE_WITHOUT_NAN: &str = "Age_without_nan";
pub const TITLE: &str = "Title";
pub const AGE_NORM: &str = "Age_norm";
pub const FARE_NORM: &str = "Fare_norm";
pub const SIBSP_NORM: &str = "SibSp_norm";
pub const PARCH_NORM: &str = "Parch_norm";

/// Columns the raw extract must carry
pub const REQUIRED_COLUMNS: [&str; 12] = [
    PASSENGER_ID,
    SURVIVED,
    PCLASS,
    NAME,
    SEX,
    AGE,
    SIBSP,
    PARCH,
    TICKET,
    FARE,
    CABIN,
    EMBARKED,
];

/// Build the canonical passenger schema.
///
/// `precision` is the decimal scale of every derived float column, which is
/// also the scale the diff compares them at.
pub fn titanic_schema(precision: u32) -> CoreResult<Schema> {
    let derived = FieldType::scaled(precision);
    Schema::new(
        vec![
            Field::required(PASSENGER_ID, FieldType::Integer),
            Field::required(SURVIVED, FieldType::Integer),
            Field::required(PCLASS, FieldType::Integer),
            Field::required(NAME, FieldType::Text),
            Field::required(SEX, FieldType::Text),
            Field::nullable(AGE, FieldType::float()),
            Field::required(SIBSP, FieldType::Integer),
            Field::required(PARCH, FieldType::Integer),
            Field::required(TICKET, FieldType::Text),
            Field::nullable(FARE, FieldType::float()),
            Field::nullable(CABIN, FieldType::Text),
            Field::nullable(EMBARKED, FieldType::Text),
            Field::nullable(AGE_WITHOUT_NAN, derived),
            Field::nullable(TITLE, FieldType::Text),
            Field::nullable(AGE_NORM, derived),
            Field::nullable(FARE_NORM, derived),
            Field::nullable(SIBSP_NORM, derived),
            Field::nullable(PARCH_NORM, derived),
        ],
        PASSENGER_ID,
    )
}
