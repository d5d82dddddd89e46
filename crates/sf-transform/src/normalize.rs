//! Min-max scaling of numeric columns

use sf_core::round_to;

/// Observed range of one column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxBounds {
    pub min: f64,
    pub max: f64,
}

impl MinMaxBounds {
    /// Bounds over the present, non-NaN values; `None` when there are none.
    pub fn fit(values: &[Option<f64>]) -> Option<Self> {
        values
            .iter()
            .flatten()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc: Option<Self>, v| {
                Some(match acc {
                    None => Self { min: v, max: v },
                    Some(b) => Self {
                        min: b.min.min(v),
                        max: b.max.max(v),
                    },
                })
            })
    }

    /// Scale `value` into `[0, 1]`, rounded to `precision` places.
    ///
    /// A zero-width range maps every value to 0.
    pub fn scale(&self, value: f64, precision: u32) -> f64 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        round_to((value - self.min) / range, precision)
    }
}

/// Min-max normalise a column; missing values stay missing.
pub fn min_max(values: &[Option<f64>], precision: u32) -> Vec<Option<f64>> {
    match MinMaxBounds::fit(values) {
        None => vec![None; values.len()],
        Some(bounds) => {
            log::debug!("min-max bounds: [{}, {}]", bounds.min, bounds.max);
            values
                .iter()
                .map(|v| {
                    v.filter(|x| !x.is_nan())
                        .map(|x| bounds.scale(x, precision))
                })
                .collect()
        }
    }
}
