//! Schedule command implementation

use anyhow::{Context, Result};
use sf_core::config::parse_time_of_day;
use sf_core::RunHistory;
use sf_sync::{DailySchedule, RunOutcome, Scheduler};
use std::time::Duration;

use crate::cli::{GlobalArgs, ScheduleArgs};
use crate::commands::common::{self, ProjectContext};

/// Execute the schedule command
pub(crate) async fn execute(args: &ScheduleArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = ProjectContext::load(global)?;
    common::init_logging(&ctx, global.verbose)?;

    let at = match &args.at {
        Some(at) => parse_time_of_day(at).context("Invalid --at value")?,
        None => ctx.config.schedule_time()?,
    };
    let poll_secs = args
        .poll_interval
        .unwrap_or(ctx.config.schedule.poll_interval_secs)
        .max(1);

    if let Some(last) = RunHistory::load(&ctx.run_results_path())
        .ok()
        .and_then(|h| h.last_success().cloned())
    {
        println!(
            "Last successful run {} finished at {} ({}ms)",
            last.run_id,
            last.finished_at,
            last.duration_ms()
        );
    }

    let coordinator = ctx.coordinator()?;
    let record = |outcome: &RunOutcome| {
        if let Err(e) = common::record_run(&ctx, outcome) {
            log::error!("failed to record run: {:#}", e);
        }
        match outcome {
            Ok(result) => println!(
                "Run {}: {} inserted, {} updated, {} deleted",
                result.run_id, result.inserted, result.updated, result.deleted
            ),
            Err(failure) => eprintln!("{}", failure),
        }
    };

    if args.run_now {
        let outcome = coordinator.run_once().await;
        record(&outcome);
    }

    println!(
        "Scheduling daily runs at {} for table {} (Ctrl-C to stop)",
        at.format("%H:%M"),
        ctx.config.database.table
    );

    let scheduler = Scheduler::new(
        coordinator,
        DailySchedule::new(at),
        Duration::from_secs(poll_secs),
    );
    let runs = scheduler.run_until(shutdown_signal(), record).await;

    println!("Scheduler stopped after {} run(s)", runs);
    Ok(())
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
