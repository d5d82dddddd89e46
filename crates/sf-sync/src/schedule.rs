//! Daily trigger and the scheduler loop that drives the coordinator.

use crate::coordinator::{RunCoordinator, RunOutcome};
use chrono::{Duration as ChronoDuration, Local, NaiveDateTime, NaiveTime};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

/// Fires once a day at a fixed wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    pub at: NaiveTime,
}

impl DailySchedule {
    pub fn new(at: NaiveTime) -> Self {
        Self { at }
    }

    /// First trigger strictly after `now`
    pub fn next_trigger(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date().and_time(self.at);
        if today > now {
            today
        } else {
            today + ChronoDuration::days(1)
        }
    }
}

type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Polls the clock and calls [`RunCoordinator::run_once`] when a trigger is due.
pub struct Scheduler {
    coordinator: Arc<RunCoordinator>,
    schedule: DailySchedule,
    poll_interval: Duration,
    clock: Clock,
}

impl Scheduler {
    pub fn new(
        coordinator: Arc<RunCoordinator>,
        schedule: DailySchedule,
        poll_interval: Duration,
    ) -> Self {
        Self {
            coordinator,
            schedule,
            poll_interval,
            clock: Arc::new(|| Local::now().naive_local()),
        }
    }

    /// Replace the wall clock
    pub fn with_clock(
        mut self,
        clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static,
    ) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Loop until `shutdown` resolves, handing each outcome to `on_outcome`.
    /// Returns the number of runs performed.
    ///
    /// The next trigger is computed after a run returns, so a run that
    /// overruns a trigger skips it rather than queueing a second run.
    pub async fn run_until<F, H>(&self, shutdown: F, mut on_outcome: H) -> usize
    where
        F: Future<Output = ()>,
        H: FnMut(&RunOutcome),
    {
        let mut next = self.schedule.next_trigger((self.clock)());
        log::info!(
            "Scheduler started, next run at {} (polling every {:?})",
            next,
            self.poll_interval
        );

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut runs = 0;
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    log::info!("Shutdown requested, stopping scheduler");
                    break;
                }
                _ = ticker.tick() => {
                    if (self.clock)() < next {
                        continue;
                    }
                    let outcome = self.coordinator.run_once().await;
                    if let Err(failure) = &outcome {
                        log::warn!("{}; retrying at the next trigger", failure);
                    }
                    on_outcome(&outcome);
                    runs += 1;
                    next = self.schedule.next_trigger((self.clock)());
                    log::info!("Next run at {}", next);
                }
            }
        }
        runs
    }
}
