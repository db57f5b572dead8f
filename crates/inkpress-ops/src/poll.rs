//! Polling driver for asynchronous operations.
//!
//! When a start request comes back with a job id instead of an inline
//! result, the owning screen spawns a poll: a background task that queries a
//! status probe on a fixed period and drives the tracker to its terminal
//! state. The returned [`PollHandle`] stops the timer when dropped, so a
//! screen tearing down can never leave an orphaned timer behind. The task
//! itself holds only a weak reference to the tracker and exits if the
//! tracker goes away first.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

use crate::model::DownloadLink;
use crate::tracker::ProgressTracker;

/// Fixed polling period used by asynchronous tools.
pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_secs(2);

/// Message shown when a status request itself fails.
const POLL_ERROR_MESSAGE: &str = "There was an error checking the operation status.";

/// One status-probe observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollReport {
    /// The job is still running. Any reported counters update the tracker.
    Working {
        /// Progress percentage when the endpoint reports one.
        progress: Option<u8>,
        /// Output files finished so far, when reported.
        completed: Option<u32>,
        /// Output files expected in total, when reported.
        total: Option<u32>,
    },
    /// The job finished; results are resolved to direct download links.
    Completed(Vec<DownloadLink>),
    /// The job failed with a user-facing message.
    Failed(String),
}

impl PollReport {
    /// A "still working" report with no counters.
    #[must_use]
    pub const fn working() -> Self {
        Self::Working {
            progress: None,
            completed: None,
            total: None,
        }
    }
}

/// Status source queried by the driver. The HTTP client implements this
/// against the status endpoint; tests substitute fixtures.
#[async_trait]
pub trait StatusProbe: Send + Sync {
    /// Query the current status of the given job.
    async fn check(&self, job_id: &str) -> anyhow::Result<PollReport>;
}

/// Handle to a running poll. Dropping (or [`PollHandle::stop`]) aborts the
/// timer task.
#[derive(Debug)]
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stop the poll immediately.
    pub fn stop(self) {
        self.task.abort();
    }

    /// Whether the poll task has finished (terminal state reached, tracker
    /// dropped, or aborted).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn a poll for `job_id` against `probe`, driving `tracker` on each
/// observation until a terminal state is reached.
///
/// The first probe fires one full `period` after spawning, matching the
/// interval behavior of the web client this replaces. Exactly one terminal
/// transition is ever applied: the task re-checks the tracker state before
/// applying an observation, and terminal transitions stop the loop.
#[must_use]
pub fn spawn_poll(
    tracker: &Arc<Mutex<ProgressTracker>>,
    probe: Arc<dyn StatusProbe>,
    job_id: String,
    period: Duration,
) -> PollHandle {
    let weak: Weak<Mutex<ProgressTracker>> = Arc::downgrade(tracker);
    let task = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The zeroth tick resolves immediately; consume it so probes run on
        // the period rather than instantly after submission.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let Some(shared) = weak.upgrade() else {
                debug!(job_id, "tracker dropped; stopping poll");
                return;
            };

            if lock(&shared).status().is_terminal() {
                return;
            }

            match probe.check(&job_id).await {
                Ok(PollReport::Working {
                    progress,
                    completed,
                    total,
                }) => {
                    let mut tracker = lock(&shared);
                    if tracker.status() == inkpress_events::OperationState::Pending {
                        let _ = tracker.begin_processing();
                    }
                    if let Some(percent) = progress {
                        tracker.report_progress(percent);
                    }
                    if let (Some(completed), Some(total)) = (completed, total) {
                        tracker.set_batch(completed, total);
                    }
                }
                Ok(PollReport::Completed(links)) => {
                    let mut tracker = lock(&shared);
                    if tracker.status().is_terminal() {
                        return;
                    }
                    if tracker.status() == inkpress_events::OperationState::Pending {
                        let _ = tracker.begin_processing();
                    }
                    if let Err(err) = tracker.complete(links) {
                        debug!(job_id, error = %err, "late completion discarded");
                    }
                    return;
                }
                Ok(PollReport::Failed(message)) => {
                    let mut tracker = lock(&shared);
                    if tracker.status().is_terminal() {
                        return;
                    }
                    if let Err(err) = tracker.fail(message) {
                        debug!(job_id, error = %err, "late failure discarded");
                    }
                    return;
                }
                Err(err) => {
                    warn!(job_id, error = %err, "status poll request failed");
                    let mut tracker = lock(&shared);
                    if !tracker.status().is_terminal() {
                        let _ = tracker.fail(POLL_ERROR_MESSAGE);
                    }
                    return;
                }
            }
        }
    });

    PollHandle { task }
}

fn lock(shared: &Arc<Mutex<ProgressTracker>>) -> std::sync::MutexGuard<'_, ProgressTracker> {
    shared.lock().expect("tracker mutex poisoned")
}
