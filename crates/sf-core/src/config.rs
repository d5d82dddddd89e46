//! Configuration types and parsing for syncflow.yml

use crate::error::{CoreError, CoreResult};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Main pipeline configuration from syncflow.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Pipeline name
    pub name: String,

    /// Where the raw CSV extract comes from
    pub source: SourceConfig,

    /// Persistent store settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Daily trigger settings for `syncflow schedule`
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Feature derivation settings
    #[serde(default)]
    pub transform: TransformConfig,

    /// Log sink settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Output directory for run results
    #[serde(default = "default_target_path")]
    pub target_path: String,
}

/// Raw data location: exactly one of `url` or `path`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// HTTP(S) URL of the CSV extract
    #[serde(default)]
    pub url: Option<String>,

    /// Local CSV file, relative to the project directory
    #[serde(default)]
    pub path: Option<String>,
}

/// Resolved source location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Url(String),
    Path(PathBuf),
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::Url(url) => write!(f, "{}", url),
            SourceLocation::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Persistent store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// DuckDB file path, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Table holding the reconciled records
    #[serde(default = "default_table")]
    pub table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            table: default_table(),
        }
    }
}

/// Schedule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Local wall-clock time of the daily run, `HH:MM`
    #[serde(default = "default_schedule_at")]
    pub at: String,

    /// Seconds between due-checks while idle
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            at: default_schedule_at(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

/// Transform configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformConfig {
    /// Decimal places kept by normalized and imputed numeric fields
    #[serde(default = "default_precision")]
    pub precision: u32,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Append log lines to this file instead of stderr
    #[serde(default)]
    pub file: Option<String>,

    /// Minimum level written
    #[serde(default)]
    pub level: LogLevel,
}

/// Log level selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Equivalent `log` filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

const MAX_PRECISION: u32 = 10;

const MEMORY_DB: &str = ":memory:";

fn default_db_path() -> String {
    "syncflow.duckdb".to_string()
}

fn default_table() -> String {
    "titanic".to_string()
}

fn default_schedule_at() -> String {
    "01:00".to_string()
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_precision() -> u32 {
    2
}

fn default_target_path() -> String {
    "target".to_string()
}

/// Parse an `HH:MM` or `HH:MM:SS` wall-clock time.
pub fn parse_time_of_day(s: &str) -> CoreResult<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|e| CoreError::ConfigParseError {
            message: format!("invalid schedule time '{}': {} (expected HH:MM)", s, e),
        })
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> CoreResult<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for syncflow.yml or syncflow.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("syncflow.yml");
        let yaml_path = dir.join("syncflow.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Pipeline name cannot be empty".to_string(),
            });
        }

        match (&self.source.url, &self.source.path) {
            (Some(_), Some(_)) => {
                return Err(CoreError::ConfigInvalid {
                    message: "source must set exactly one of 'url' or 'path', not both"
                        .to_string(),
                })
            }
            (None, None) => {
                return Err(CoreError::ConfigInvalid {
                    message: "source must set one of 'url' or 'path'".to_string(),
                })
            }
            _ => {}
        }

        if self.database.table.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.table cannot be empty".to_string(),
            });
        }

        if self.schedule.poll_interval_secs == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "schedule.poll_interval_secs must be greater than zero".to_string(),
            });
        }
        parse_time_of_day(&self.schedule.at)?;

        if self.transform.precision > MAX_PRECISION {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "transform.precision must be at most {}, got {}",
                    MAX_PRECISION, self.transform.precision
                ),
            });
        }

        Ok(())
    }

    /// Daily trigger time
    pub fn schedule_time(&self) -> CoreResult<NaiveTime> {
        parse_time_of_day(&self.schedule.at)
    }

    /// Resolve the source location against a project root
    pub fn source_location(&self, root: &Path) -> SourceLocation {
        match (&self.source.url, &self.source.path) {
            (Some(url), _) => SourceLocation::Url(url.clone()),
            (None, Some(path)) => SourceLocation::Path(root.join(path)),
            // validate() rules this out; an empty path surfaces as a read error
            (None, None) => SourceLocation::Path(PathBuf::new()),
        }
    }

    /// Database path resolved against a project root (`:memory:` is kept as-is)
    pub fn database_path(&self, root: &Path) -> String {
        if self.database.path == MEMORY_DB {
            return self.database.path.clone();
        }
        root.join(&self.database.path).display().to_string()
    }

    /// Log file resolved against a project root
    pub fn log_file_absolute(&self, root: &Path) -> Option<PathBuf> {
        self.logging.file.as_ref().map(|f| root.join(f))
    }

    /// Get absolute target path relative to a project root
    pub fn target_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.target_path)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
