//! Missing-value imputation

use crate::extract::Passenger;
use sf_core::round_to;
use std::collections::BTreeMap;

/// Decimal places of the imputed mean age
const MEAN_AGE_PLACES: u32 = 2;

/// Passenger with missing values filled in
#[derive(Debug, Clone, PartialEq)]
pub struct CleanPassenger {
    pub raw: Passenger,
    /// `Age`, or the rounded mean age when `Age` is missing
    pub age_without_nan: Option<f64>,
}

/// Fill missing ages, embarkation ports and cabins.
///
/// Columns with no present value at all stay null.
pub fn preprocess(passengers: Vec<Passenger>) -> Vec<CleanPassenger> {
    let mean_age =
        mean(passengers.iter().filter_map(|p| p.age)).map(|m| round_to(m, MEAN_AGE_PLACES));
    let embarked = mode(passengers.iter().filter_map(|p| p.embarked.as_deref()));
    let cabin = mode(passengers.iter().filter_map(|p| p.cabin.as_deref()));

    log::debug!(
        "Imputation values: age={:?} embarked={:?} cabin={:?}",
        mean_age,
        embarked,
        cabin
    );

    passengers
        .into_iter()
        .map(|mut raw| {
            // NaN counts as missing, like an empty field.
            raw.age = raw.age.filter(|a| !a.is_nan());
            if raw.embarked.is_none() {
                raw.embarked.clone_from(&embarked);
            }
            if raw.cabin.is_none() {
                raw.cabin.clone_from(&cabin);
            }
            let age_without_nan = raw.age.or(mean_age);
            CleanPassenger {
                raw,
                age_without_nan,
            }
        })
        .collect()
}

/// Arithmetic mean, ignoring NaN
pub fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Most frequent value; ties go to the lexicographically smallest.
pub fn mode<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(v, _)| v.to_string())
}

#[cfg(test)]
#[path = "preprocess_test.rs"]
mod tests;
