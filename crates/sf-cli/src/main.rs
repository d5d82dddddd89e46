//! Syncflow CLI - incremental reconciliation of a transformed extract into DuckDB

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::common::ExitCode;
use commands::{diff, report, run, schedule, validate};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let result = match &cli.command {
        cli::Commands::Run(args) => run::execute(args, &cli.global).await,
        cli::Commands::Schedule(args) => schedule::execute(args, &cli.global).await,
        cli::Commands::Diff(args) => diff::execute(args, &cli.global).await,
        cli::Commands::Report(args) => report::execute(args, &cli.global).await,
        cli::Commands::Validate(args) => validate::execute(args, &cli.global).await,
    };

    match result {
        Err(err) => match err.downcast_ref::<ExitCode>() {
            Some(ExitCode(code)) => std::process::exit(*code),
            None => Err(err),
        },
        ok => ok,
    }
}
