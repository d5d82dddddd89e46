//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use sf_core::{Config, RunHistory};
use sf_db::DuckDbConnector;
use sf_sync::{to_run_record, RunCoordinator, RunOutcome};
use sf_transform::TitanicPipeline;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main() exits without printing it.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// File name of the run history inside the target directory
pub(crate) const RUN_RESULTS_FILE: &str = "run_results.json";

/// Loaded configuration plus the directory it is resolved against
pub(crate) struct ProjectContext {
    pub root: PathBuf,
    pub config: Config,
}

impl ProjectContext {
    /// Load `syncflow.yml` and apply global overrides
    pub(crate) fn load(global: &GlobalArgs) -> Result<Self> {
        let root = PathBuf::from(&global.project_dir);
        let mut config = match &global.config {
            Some(path) => {
                Config::load(Path::new(path)).context("Failed to load configuration file")?
            }
            None => Config::load_from_dir(&root).context("Failed to load project configuration")?,
        };
        if let Some(db) = &global.database {
            config.database.path = db.clone();
        }
        Ok(Self { root, config })
    }

    pub(crate) fn database_path(&self) -> String {
        self.config.database_path(&self.root)
    }

    pub(crate) fn run_results_path(&self) -> PathBuf {
        self.config
            .target_path_absolute(&self.root)
            .join(RUN_RESULTS_FILE)
    }

    /// Transform stage for the configured source
    pub(crate) fn pipeline(&self) -> Result<TitanicPipeline> {
        TitanicPipeline::new(
            self.config.source_location(&self.root),
            self.config.transform.precision,
        )
        .context("Failed to build transform pipeline")
    }

    /// Store connector for the configured database and table
    pub(crate) fn connector(&self) -> Result<DuckDbConnector> {
        let path = self.database_path();
        if let Some(parent) = Path::new(&path).parent() {
            if !parent.as_os_str().is_empty() && path != ":memory:" {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
            }
        }
        DuckDbConnector::new(&path, &self.config.database.table)
            .context("Failed to open database")
    }

    /// Coordinator wired to the configured pipeline and store
    pub(crate) fn coordinator(&self) -> Result<Arc<RunCoordinator>> {
        Ok(Arc::new(RunCoordinator::new(
            Arc::new(self.pipeline()?),
            Arc::new(self.connector()?),
        )))
    }
}

/// Initialise the `log` backend once for the process.
///
/// Writes `timestamp:LEVEL:message` lines to the configured log file
/// (appending) or to stderr. `SYNCFLOW_LOG` overrides the level filter.
pub(crate) fn init_logging(ctx: &ProjectContext, verbose: bool) -> Result<()> {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        ctx.config.logging.level.to_level_filter()
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .parse_env("SYNCFLOW_LOG")
        .format(|buf, record| {
            writeln!(
                buf,
                "{}:{}:{}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                record.level(),
                record.args()
            )
        });

    if let Some(path) = ctx.config.log_file_absolute(&ctx.root) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create log directory")?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.try_init().context("Failed to initialise logging")?;
    Ok(())
}

/// Append the outcome to `target/run_results.json`.
pub(crate) fn record_run(ctx: &ProjectContext, outcome: &RunOutcome) -> Result<()> {
    let path = ctx.run_results_path();
    let mut history = RunHistory::load(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    history.push(to_run_record(outcome));
    history
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Serialize `data` as pretty-printed JSON to stdout.
pub(crate) fn print_json<T: serde::Serialize + ?Sized>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

// ---------------------------------------------------------------------------
// Table-printing utilities
// ---------------------------------------------------------------------------

/// Calculate column widths for a table given headers and row data.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    widths
}

/// Print a left-aligned table with a dashed separator under the header.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  "));

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  "));
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
