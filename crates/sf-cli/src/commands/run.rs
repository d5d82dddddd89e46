//! Run command implementation

use anyhow::Result;
use sf_sync::{to_run_record, RunOutcome, RunStage};

use crate::cli::{GlobalArgs, OutputFormat, RunArgs};
use crate::commands::common::{self, ExitCode, ProjectContext};

/// Execute the run command
pub(crate) async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = ProjectContext::load(global)?;
    common::init_logging(&ctx, global.verbose)?;

    let coordinator = ctx.coordinator()?;
    let outcome = coordinator.run_once().await;
    match args.output {
        OutputFormat::Json => common::print_json(&to_run_record(&outcome))?,
        OutputFormat::Text => print_outcome(&ctx, &outcome),
    }

    // Reconciliation has committed; a history error only warns.
    if let Err(e) = common::record_run(&ctx, &outcome) {
        log::error!("failed to record run: {:#}", e);
        eprintln!("Warning: failed to record run: {:#}", e);
    }

    match outcome {
        Ok(_) => Ok(()),
        Err(failure) if failure.stage == RunStage::Busy => Err(ExitCode(2).into()),
        Err(_) => Err(ExitCode(1).into()),
    }
}

fn print_outcome(ctx: &ProjectContext, outcome: &RunOutcome) {
    match outcome {
        Ok(result) => {
            let table = &ctx.config.database.table;
            if result.bootstrap {
                println!("Created table {} with {} records", table, result.inserted);
            } else if result.inserted + result.updated + result.deleted == 0 {
                println!(
                    "Table {} already up to date ({} records)",
                    table, result.records
                );
            } else {
                println!(
                    "Reconciled table {}: {} inserted, {} updated, {} deleted",
                    table, result.inserted, result.updated, result.deleted
                );
            }
            let elapsed = (result.finished_at - result.started_at).num_milliseconds();
            println!("Run {} finished in {}ms", result.run_id, elapsed);
        }
        Err(failure) => {
            eprintln!(
                "Run {} failed during {}: {}",
                failure.run_id, failure.stage, failure.cause
            );
        }
    }
}
