use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use gitsyncd_logging::LogEvent;
use gitsyncd_runner::CommandRunner;

use crate::outcome::{CycleOutcome, RunSummary};
use crate::ticker::Ticker;
use crate::Repository;

/// Drives [`Repository::sync`] from a [`Ticker`].
///
/// Per-cycle errors are logged and polling carries on. At most one sync runs
/// at a time; a cycle started while another is in flight is skipped.
pub struct SyncLoop<'a, R> {
    repo: &'a Repository<R>,
    in_flight: AtomicBool,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<'a, R: CommandRunner> SyncLoop<'a, R> {
    pub fn new(repo: &'a Repository<R>) -> Self {
        Self {
            repo,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Run a single sync, unless one is already running
    pub async fn run_cycle(&self) -> CycleOutcome {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.repo.sink().log(&LogEvent::TickSkipped);
            return CycleOutcome::Skipped;
        }
        let _guard = InFlightGuard(&self.in_flight);

        match self.repo.sync().await {
            Ok(outcome) => {
                debug!(revision = outcome.revision(), "Sync cycle complete");
                CycleOutcome::Synced(outcome)
            }
            Err(e) => {
                debug!("Sync cycle failed");
                let error = e.to_string();
                self.repo.sink().log(&LogEvent::SyncFailed {
                    error: error.clone(),
                });
                CycleOutcome::Failed(error)
            }
        }
    }

    /// Sync on every tick until the ticker stops
    pub async fn run<T: Ticker + ?Sized>(&self, ticker: &mut T) -> RunSummary {
        let mut summary = RunSummary::default();

        while ticker.tick().await {
            let cycle = self.run_cycle().await;
            summary.record(&cycle);
        }

        debug!(ticks = summary.ticks, "Sync loop stopped");
        self.repo.sink().log(&LogEvent::SyncLoopStopped {
            ticks: summary.ticks,
            updates: summary.updates,
            failures: summary.failures,
        });

        summary
    }
}
