//! End-to-end transform: extract, impute, derive titles, normalise.

use crate::error::TransformResult;
use crate::extract::{Extractor, Passenger};
use crate::features::TitleExtractor;
use crate::normalize::min_max;
use crate::preprocess::{preprocess, CleanPassenger};
use crate::schema::titanic_schema;
use async_trait::async_trait;
use sf_core::{Dataset, DatasetSource, Schema, SourceError, SourceLocation, Value};
use std::sync::Arc;

/// Produces the canonical passenger dataset
pub struct TitanicPipeline {
    extractor: Extractor,
    transform: TitanicTransform,
}

impl TitanicPipeline {
    /// Pipeline reading from `location`, canonicalising derived floats to
    /// `precision` decimal places.
    pub fn new(location: SourceLocation, precision: u32) -> TransformResult<Self> {
        Ok(Self {
            extractor: Extractor::new(location)?,
            transform: TitanicTransform::new(precision)?,
        })
    }

    /// Declared output schema
    pub fn schema(&self) -> &Arc<Schema> {
        self.transform.schema()
    }

    /// Extract and transform in one step
    pub async fn run(&self) -> TransformResult<Dataset> {
        let passengers = self.extractor.extract().await?;
        self.transform.apply(passengers)
    }
}

#[async_trait]
impl DatasetSource for TitanicPipeline {
    async fn produce(&self) -> Result<Dataset, SourceError> {
        Ok(self.run().await?)
    }

    fn describe(&self) -> String {
        self.extractor.describe()
    }
}

/// Pure derivation from raw passengers to the canonical dataset
#[derive(Debug, Clone)]
pub struct TitanicTransform {
    precision: u32,
    titles: TitleExtractor,
    schema: Arc<Schema>,
}

impl TitanicTransform {
    pub fn new(precision: u32) -> TransformResult<Self> {
        Ok(Self {
            precision,
            titles: TitleExtractor::new()?,
            schema: Arc::new(titanic_schema(precision)?),
        })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Derive every canonical column and validate the rows against the schema.
    pub fn apply(&self, passengers: Vec<Passenger>) -> TransformResult<Dataset> {
        let clean = preprocess(passengers);
        log::info!("preprocessing completed");

        let titles: Vec<Option<String>> = clean
            .iter()
            .map(|p| self.titles.extract(&p.raw.name))
            .collect();
        log::info!("feature engineering completed");

        let column = |f: fn(&CleanPassenger) -> Option<f64>| -> Vec<Option<f64>> {
            let values: Vec<Option<f64>> = clean.iter().map(f).collect();
            min_max(&values, self.precision)
        };
        let age_norm = column(|p| p.age_without_nan);
        let fare_norm = column(|p| p.raw.fare);
        let sib_sp_norm = column(|p| Some(p.raw.sib_sp as f64));
        let parch_norm = column(|p| Some(p.raw.parch as f64));
        log::info!("normalization completed");

        let rows = clean
            .into_iter()
            .zip(titles)
            .enumerate()
            .map(|(i, (p, title))| {
                let raw = p.raw;
                vec![
                    Value::Integer(raw.passenger_id),
                    Value::Integer(raw.survived),
                    Value::Integer(raw.pclass),
                    Value::Text(raw.name),
                    Value::Text(raw.sex),
                    Value::from(raw.age),
                    Value::Integer(raw.sib_sp),
                    Value::Integer(raw.parch),
                    Value::Text(raw.ticket),
                    Value::from(raw.fare),
                    Value::from(raw.cabin),
                    Value::from(raw.embarked),
                    Value::from(p.age_without_nan),
                    Value::from(title),
                    Value::from(age_norm[i]),
                    Value::from(fare_norm[i]),
                    Value::from(sib_sp_norm[i]),
                    Value::from(parch_norm[i]),
                ]
            })
            .collect();

        Ok(Dataset::from_rows(Arc::clone(&self.schema), rows)?)
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
