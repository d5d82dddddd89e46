//! Raw passenger extraction from a local CSV file or an HTTP URL.

use crate::error::{TransformError, TransformResult};
use crate::schema::REQUIRED_COLUMNS;
use serde::{Deserialize, Deserializer};
use sf_core::SourceLocation;
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Field contents read as a missing value, besides the empty field
const NA_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_na(field: &str) -> bool {
    NA_TOKENS.contains(&field)
}

/// Optional text field; NA tokens read as `None`
fn na_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty() && !is_na(s)))
}

/// Optional float field; NA tokens and NaN read as `None`
fn na_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    match na_string(deserializer)? {
        None => Ok(None),
        Some(s) => {
            let value: f64 = s
                .trim()
                .parse()
                .map_err(|e| serde::de::Error::custom(format!("invalid float '{}': {}", s, e)))?;
            Ok((!value.is_nan()).then_some(value))
        }
    }
}

/// One row of the raw extract, before any derivation
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Passenger {
    #[serde(rename = "PassengerId")]
    pub passenger_id: i64,
    #[serde(rename = "Survived")]
    pub survived: i64,
    #[serde(rename = "Pclass")]
    pub pclass: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Sex")]
    pub sex: String,
    #[serde(rename = "Age", default, deserialize_with = "na_f64")]
    pub age: Option<f64>,
    #[serde(rename = "SibSp")]
    pub sib_sp: i64,
    #[serde(rename = "Parch")]
    pub parch: i64,
    #[serde(rename = "Ticket")]
    pub ticket: String,
    #[serde(rename = "Fare", default, deserialize_with = "na_f64")]
    pub fare: Option<f64>,
    #[serde(rename = "Cabin", default, deserialize_with = "na_string")]
    pub cabin: Option<String>,
    #[serde(rename = "Embarked", default, deserialize_with = "na_string")]
    pub embarked: Option<String>,
}

/// Parse raw CSV bytes into passengers.
///
/// A header-only extract yields an empty list. An empty body is an error so
/// that a failed download never reads as "every passenger was removed".
pub fn parse_passengers(data: &[u8], origin: &str) -> TransformResult<Vec<Passenger>> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    if data.iter().all(u8::is_ascii_whitespace) {
        return Err(TransformError::EmptyExtract(origin.to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data);

    let headers = reader.headers()?;
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|col| !headers.iter().any(|h| h == **col))
    {
        return Err(TransformError::MissingColumn(missing.to_string()));
    }

    let passengers = reader
        .deserialize::<Passenger>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(passengers)
}

/// Fetches the raw extract from its configured location
pub struct Extractor {
    location: SourceLocation,
    client: reqwest::Client,
}

impl Extractor {
    /// Create an extractor for `location`
    pub fn new(location: SourceLocation) -> TransformResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| TransformError::Http {
                url: location.to_string(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { location, client })
    }

    /// Human-readable source for logs
    pub fn describe(&self) -> String {
        self.location.to_string()
    }

    /// Fetch the raw body without parsing it
    pub async fn fetch(&self) -> TransformResult<Vec<u8>> {
        match &self.location {
            SourceLocation::Path(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| TransformError::Read {
                        path: path.display().to_string(),
                        source,
                    })
            }
            SourceLocation::Url(url) => {
                let http_err = |message: String| TransformError::Http {
                    url: url.clone(),
                    message,
                };
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| http_err(e.to_string()))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(http_err(format!("unexpected status {status}")));
                }
                let body = response.bytes().await.map_err(|e| http_err(e.to_string()))?;
                Ok(body.to_vec())
            }
        }
    }

    /// Fetch and parse the extract
    pub async fn extract(&self) -> TransformResult<Vec<Passenger>> {
        let body = self.fetch().await?;
        let origin = self.describe();
        let passengers = parse_passengers(&body, &origin)?;
        log::info!("Extracted {} rows from {}", passengers.len(), origin);
        Ok(passengers)
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
