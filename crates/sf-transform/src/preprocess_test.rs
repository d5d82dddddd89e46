use super::*;

fn passenger(id: i64, age: Option<f64>, cabin: Option<&str>, embarked: Option<&str>) -> Passenger {
    Passenger {
        passenger_id: id,
        survived: 0,
        pclass: 3,
        name: format!("Doe, Mr. {id}"),
        sex: "male".to_string(),
        age,
        sib_sp: 0,
        parch: 0,
        ticket: "T".to_string(),
        fare: Some(7.25),
        cabin: cabin.map(str::to_string),
        embarked: embarked.map(str::to_string),
    }
}

#[test]
fn test_missing_age_filled_with_rounded_mean() {
    let out = preprocess(vec![
        passenger(1, Some(1.0), None, None),
        passenger(2, Some(2.0), None, None),
        passenger(3, Some(2.0), None, None),
        passenger(4, None, None, None),
    ]);
    // mean = 5/3 = 1.666..
    assert_eq!(out[3].age_without_nan, Some(1.67));
    assert_eq!(out[3].raw.age, None);
    assert_eq!(out[0].age_without_nan, Some(1.0));
}

#[test]
fn test_nan_age_is_treated_as_missing() {
    let out = preprocess(vec![
        passenger(1, Some(20.0), None, None),
        passenger(2, Some(f64::NAN), None, None),
        passenger(3, Some(30.0), None, None),
    ]);
    assert_eq!(out[1].age_without_nan, Some(25.0));
    assert_eq!(out[1].raw.age, None);
}

#[test]
fn test_mode_fills_cabin_and_embarked() {
    let out = preprocess(vec![
        passenger(1, None, Some("C85"), Some("Q")),
        passenger(2, None, Some("C123"), Some("S")),
        passenger(3, None, None, Some("S")),
        passenger(4, None, None, None),
    ]);
    assert_eq!(out[3].raw.embarked.as_deref(), Some("S"));
    // tie between C123 and C85 goes to the smaller value
    assert_eq!(out[2].raw.cabin.as_deref(), Some("C123"));
    assert_eq!(out[0].raw.cabin.as_deref(), Some("C85"));
}

#[test]
fn test_all_null_columns_stay_null() {
    let out = preprocess(vec![passenger(1, None, None, None)]);
    assert_eq!(out[0].age_without_nan, None);
    assert_eq!(out[0].raw.cabin, None);
    assert_eq!(out[0].raw.embarked, None);
}

#[test]
fn test_empty_input() {
    assert!(preprocess(Vec::new()).is_empty());
}

#[test]
fn test_mean_and_mode_helpers() {
    assert_eq!(mean([1.0, 2.0, f64::NAN].into_iter()), Some(1.5));
    assert_eq!(mean(std::iter::empty()), None);
    assert_eq!(mode(["b", "a", "b"].into_iter()).as_deref(), Some("b"));
    assert_eq!(mode(std::iter::empty()), None);
}
