//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Syncflow - Incremental reconciliation of a transformed extract into DuckDB
#[derive(Parser, Debug)]
#[command(name = "syncflow")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the database path (`:memory:` allowed)
    #[arg(short, long, global = true, env = "SYNCFLOW_DATABASE")]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract, transform, and reconcile once
    Run(RunArgs),

    /// Run on the daily schedule until interrupted
    Schedule(ScheduleArgs),

    /// Show the inserts, updates, and deletes the next run would apply
    Diff(DiffArgs),

    /// Print survival analysis over the reconciled table
    Report(ReportArgs),

    /// Check configuration and the stored table schema
    Validate(ValidateArgs),
}

/// Output formats shared by several commands
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the schedule command
#[derive(Args, Debug)]
pub struct ScheduleArgs {
    /// Override the daily trigger time (HH:MM)
    #[arg(long)]
    pub at: Option<String>,

    /// Override the poll interval in seconds
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Run once immediately before waiting for the first trigger
    #[arg(long)]
    pub run_now: bool,
}

/// Arguments for the diff command
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// List the changed fields of every updated record
    #[arg(long)]
    pub fields: bool,

    /// Maximum number of identifiers listed per partition
    #[arg(long, default_value = "20")]
    pub limit: usize,
}

/// Arguments for the report command
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Also fetch and transform the source extract
    #[arg(long)]
    pub source: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
