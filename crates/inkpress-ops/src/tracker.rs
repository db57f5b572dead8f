//! The [`ProgressTracker`] consumed by every tool surface.
//!
//! A tracker wraps one [`Operation`] and layers on the caller-facing
//! contract: which actions are offered in which states, the two-step cancel
//! confirmation, an exactly-once completion callback, bus notifications, and
//! the render snapshot (status label, percentage, elapsed time, batch
//! summary, caller-supplied time remaining).

use chrono::Utc;
use inkpress_events::{Event, EventBus, OperationState};
use tracing::debug;
use uuid::Uuid;

use crate::error::{OpsError, OpsResult};
use crate::model::{DownloadLink, InputFile, Operation};
use crate::poll::PollHandle;

/// Opt-in switches supplied by the owning screen. Actions that were not
/// opted in to are never offered and their methods error.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackerOptions {
    /// Offer cancel (with confirmation) while work is in flight.
    pub allow_cancel: bool,
    /// Offer pause/resume while processing.
    pub allow_pause: bool,
    /// Offer retry after a failure.
    pub allow_retry: bool,
    /// The owner supplied a view-result handler for completed operations.
    pub has_result_handler: bool,
}

/// User-facing actions a tracker can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Re-issue the original request after a failure.
    Retry,
    /// Cancel the in-flight operation (requires confirmation).
    Cancel,
    /// Suspend processing.
    Pause,
    /// Resume from a paused state.
    Resume,
    /// Open the completed result.
    ViewResult,
}

/// Render snapshot consumed by output layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    /// Current lifecycle state.
    pub status: OperationState,
    /// Status badge text.
    pub label: &'static str,
    /// Progress percentage, 0-100.
    pub percent: u8,
    /// Seconds since submission; ticks while pending/processing and freezes
    /// at terminal states.
    pub elapsed_seconds: Option<u64>,
    /// "`X` of `Y` files" summary when the owner supplied batch counts.
    pub files_summary: Option<String>,
    /// Caller-supplied time remaining; surfaced only while processing. The
    /// tracker never computes its own estimate.
    pub remaining_seconds: Option<u64>,
}

type CompleteCallback = Box<dyn FnOnce(&[DownloadLink]) + Send>;
type CancelCallback = Box<dyn FnMut() + Send>;

/// Lifecycle tracker for one operation, owned by the screen that created it.
pub struct ProgressTracker {
    id: Uuid,
    tool: String,
    operation: Operation,
    options: TrackerOptions,
    bus: Option<EventBus>,
    on_complete: Option<CompleteCallback>,
    on_cancel: Option<CancelCallback>,
    batch: Option<(u32, u32)>,
    eta_seconds: Option<u64>,
    poll: Option<PollHandle>,
}

impl ProgressTracker {
    /// Create an idle tracker for the named tool.
    #[must_use]
    pub fn new(tool: impl Into<String>, options: TrackerOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            tool: tool.into(),
            operation: Operation::new(),
            options,
            bus: None,
            on_complete: None,
            on_cancel: None,
            batch: None,
            eta_seconds: None,
            poll: None,
        }
    }

    /// Attach an event bus; subsequent transitions are published to it.
    #[must_use]
    pub fn with_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Local identifier used in published events.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Tool that owns this tracker.
    #[must_use]
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// The tracked operation, read-only.
    #[must_use]
    pub const fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn status(&self) -> OperationState {
        self.operation.status()
    }

    /// Register the completion callback. Fires exactly once, on the
    /// transition into `completed`.
    pub fn on_complete(&mut self, callback: impl FnOnce(&[DownloadLink]) + Send + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    /// Register the cancel callback, invoked after the user confirms. The
    /// callback may attempt server-side cancellation; the server is not
    /// guaranteed to undo work already in flight.
    pub fn on_cancel(&mut self, callback: impl FnMut() + Send + 'static) {
        self.on_cancel = Some(Box::new(callback));
    }

    /// Supply multi-file batch counts for the "`X` of `Y` files" summary.
    pub fn set_batch(&mut self, completed: u32, total: u32) {
        self.batch = Some((completed, total));
    }

    /// Supply (or clear) the caller-computed time-remaining estimate.
    pub fn set_eta_seconds(&mut self, seconds: Option<u64>) {
        self.eta_seconds = seconds;
    }

    /// Attach an input file; see [`Operation::attach_input`].
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InputsFrozen`] once submission has started.
    pub fn attach_input(&mut self, file: InputFile) -> OpsResult<()> {
        self.operation.attach_input(file)
    }

    /// Submit the operation (`idle → pending`).
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidTransition`] unless the tracker is idle.
    pub fn submit(&mut self) -> OpsResult<()> {
        self.operation.submit()?;
        self.publish(Event::OperationStarted {
            operation_id: self.id,
            tool: self.tool.clone(),
        });
        self.publish_state();
        Ok(())
    }

    /// Acknowledge that work started (`pending → processing`).
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidTransition`] unless the tracker is pending.
    pub fn begin_processing(&mut self) -> OpsResult<()> {
        self.operation.begin_processing()?;
        self.publish_state();
        Ok(())
    }

    /// Record the remote job identifier for an asynchronous operation.
    pub fn assign_job_id(&mut self, job_id: impl Into<String>) {
        self.operation.assign_job_id(job_id);
    }

    /// Report progress; clamped and monotonic per [`Operation::report_progress`].
    pub fn report_progress(&mut self, percent: u8) {
        let before = self.operation.progress();
        self.operation.report_progress(percent);
        let after = self.operation.progress();
        if after != before {
            self.publish(Event::Progress {
                operation_id: self.id,
                percent: after,
            });
        }
    }

    /// Enter `completed`, firing the completion callback exactly once.
    ///
    /// Any active polling timer is stopped before the callback runs so a
    /// late status response cannot re-trigger a transition.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidTransition`] unless the tracker is pending
    /// or processing.
    pub fn complete(&mut self, results: Vec<DownloadLink>) -> OpsResult<()> {
        self.operation.complete(results)?;
        self.stop_poll();
        self.publish_state();
        self.publish(Event::Completed {
            operation_id: self.id,
            file_count: self.operation.results().map_or(0, <[DownloadLink]>::len),
        });
        if let Some(callback) = self.on_complete.take() {
            let results = self.operation.results().unwrap_or_default();
            callback(results);
        }
        Ok(())
    }

    /// Enter `failed` with a user-facing message, stopping any polling.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidTransition`] unless the tracker is pending,
    /// processing, or paused.
    pub fn fail(&mut self, message: impl Into<String>) -> OpsResult<()> {
        let message = message.into();
        self.operation.fail(message.clone())?;
        self.stop_poll();
        self.publish_state();
        self.publish(Event::Failed {
            operation_id: self.id,
            message,
        });
        Ok(())
    }

    /// Suspend processing. Offered only when the owner opted in.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::ActionNotEnabled`] without the pause opt-in and
    /// [`OpsError::ActionUnavailable`] outside `processing`.
    pub fn pause(&mut self) -> OpsResult<()> {
        if !self.options.allow_pause {
            return Err(OpsError::ActionNotEnabled { action: "pause" });
        }
        if self.status() != OperationState::Processing {
            return Err(OpsError::ActionUnavailable {
                action: "pause",
                state: self.status(),
            });
        }
        self.operation.pause()?;
        self.publish_state();
        Ok(())
    }

    /// Resume from `paused`.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::ActionNotEnabled`] without the pause opt-in and
    /// [`OpsError::ActionUnavailable`] outside `paused`.
    pub fn resume(&mut self) -> OpsResult<()> {
        if !self.options.allow_pause {
            return Err(OpsError::ActionNotEnabled { action: "resume" });
        }
        if self.status() != OperationState::Paused {
            return Err(OpsError::ActionUnavailable {
                action: "resume",
                state: self.status(),
            });
        }
        self.operation.resume()?;
        self.publish_state();
        Ok(())
    }

    /// Re-issue after a failure (`failed → pending`). The caller re-sends
    /// the original request; input files are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::ActionNotEnabled`] without the retry opt-in and
    /// [`OpsError::ActionUnavailable`] outside `failed`.
    pub fn retry(&mut self) -> OpsResult<()> {
        if !self.options.allow_retry {
            return Err(OpsError::ActionNotEnabled { action: "retry" });
        }
        if self.status() != OperationState::Failed {
            return Err(OpsError::ActionUnavailable {
                action: "retry",
                state: self.status(),
            });
        }
        self.operation.retry()?;
        self.publish_state();
        Ok(())
    }

    /// Begin the cancel flow. Nothing changes until the returned gate is
    /// confirmed; declining (or dropping) the gate is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::ActionNotEnabled`] without the cancel opt-in and
    /// [`OpsError::ActionUnavailable`] unless work is in flight or paused.
    pub fn request_cancel(&mut self) -> OpsResult<CancelGate<'_>> {
        if !self.options.allow_cancel {
            return Err(OpsError::ActionNotEnabled { action: "cancel" });
        }
        if !matches!(
            self.status(),
            OperationState::Pending | OperationState::Processing | OperationState::Paused
        ) {
            return Err(OpsError::ActionUnavailable {
                action: "cancel",
                state: self.status(),
            });
        }
        Ok(CancelGate { tracker: self })
    }

    /// Actions currently offered, per the availability rules.
    #[must_use]
    pub fn available_actions(&self) -> Vec<Action> {
        let mut actions = Vec::new();
        let status = self.status();
        if self.options.allow_retry && status == OperationState::Failed {
            actions.push(Action::Retry);
        }
        if self.options.allow_cancel
            && matches!(
                status,
                OperationState::Pending | OperationState::Processing | OperationState::Paused
            )
        {
            actions.push(Action::Cancel);
        }
        if self.options.allow_pause {
            if status == OperationState::Processing {
                actions.push(Action::Pause);
            }
            if status == OperationState::Paused {
                actions.push(Action::Resume);
            }
        }
        if self.options.has_result_handler && status == OperationState::Completed {
            actions.push(Action::ViewResult);
        }
        actions
    }

    /// Replace the polling timer for this tracker. Any previous timer is
    /// stopped first so at most one is ever active.
    pub fn attach_poll(&mut self, handle: PollHandle) {
        self.stop_poll();
        self.poll = Some(handle);
    }

    /// Stop the polling timer if one is active.
    pub fn stop_poll(&mut self) {
        if let Some(handle) = self.poll.take() {
            handle.stop();
        }
    }

    /// Whether a polling timer is currently attached.
    #[must_use]
    pub const fn has_poll(&self) -> bool {
        self.poll.is_some()
    }

    /// Reset to a fresh idle tracker, stopping any polling timer.
    pub fn reset(&mut self) {
        self.stop_poll();
        self.operation.reset();
        self.batch = None;
        self.eta_seconds = None;
        self.publish_state();
    }

    /// Render snapshot for output layers.
    #[must_use]
    pub fn view(&self) -> ProgressView {
        let status = self.status();
        let remaining_seconds = if status == OperationState::Processing {
            self.eta_seconds
        } else {
            None
        };
        let files_summary = self
            .batch
            .map(|(completed, total)| format!("{completed} of {total} files"));
        ProgressView {
            status,
            label: status.label(),
            percent: self.operation.progress(),
            elapsed_seconds: self.operation.elapsed_seconds(Utc::now()),
            files_summary,
            remaining_seconds,
        }
    }

    fn cancel_confirmed(&mut self) -> OpsResult<()> {
        self.operation.cancel()?;
        self.stop_poll();
        self.publish_state();
        if let Some(callback) = self.on_cancel.as_mut() {
            callback();
        }
        Ok(())
    }

    fn publish_state(&self) {
        debug!(
            operation = %self.id,
            tool = %self.tool,
            state = self.status().label(),
            "operation state changed"
        );
        self.publish(Event::StateChanged {
            operation_id: self.id,
            state: self.status(),
        });
    }

    fn publish(&self, event: Event) {
        if let Some(bus) = &self.bus {
            bus.publish(event);
        }
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        // Teardown must not leave an orphaned polling timer behind.
        self.stop_poll();
    }
}

/// Confirmation gate returned by [`ProgressTracker::request_cancel`].
///
/// The cancel transition happens only through [`CancelGate::confirm`];
/// declining or dropping the gate leaves the operation untouched.
pub struct CancelGate<'a> {
    tracker: &'a mut ProgressTracker,
}

impl CancelGate<'_> {
    /// The user accepted the confirmation prompt: cancel the operation,
    /// stop any polling, and invoke the cancel callback.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidTransition`] if another terminal
    /// transition won the race since the gate was created.
    pub fn confirm(self) -> OpsResult<()> {
        self.tracker.cancel_confirmed()
    }

    /// The user declined: nothing changes.
    pub fn decline(self) {
        debug!(operation = %self.tracker.id, "cancel declined");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn submitted_tracker(options: TrackerOptions) -> ProgressTracker {
        let mut tracker = ProgressTracker::new("split", options);
        tracker
            .attach_input(InputFile::new("in.pdf", vec![1]))
            .expect("idle accepts inputs");
        tracker.submit().expect("idle to pending");
        tracker
    }

    fn all_actions() -> TrackerOptions {
        TrackerOptions {
            allow_cancel: true,
            allow_pause: true,
            allow_retry: true,
            has_result_handler: true,
        }
    }

    #[test]
    fn actions_follow_availability_rules() {
        let mut tracker = submitted_tracker(all_actions());
        assert_eq!(tracker.available_actions(), vec![Action::Cancel]);

        tracker.begin_processing().expect("pending to processing");
        assert_eq!(
            tracker.available_actions(),
            vec![Action::Cancel, Action::Pause]
        );

        tracker.pause().expect("processing to paused");
        assert_eq!(
            tracker.available_actions(),
            vec![Action::Cancel, Action::Resume]
        );

        tracker.resume().expect("paused to processing");
        tracker.fail("boom").expect("fails");
        assert_eq!(tracker.available_actions(), vec![Action::Retry]);

        tracker.retry().expect("failed to pending");
        tracker.begin_processing().expect("pending to processing");
        tracker.complete(Vec::new()).expect("completes");
        assert_eq!(tracker.available_actions(), vec![Action::ViewResult]);
    }

    #[test]
    fn opted_out_actions_are_never_offered() {
        let mut tracker = submitted_tracker(TrackerOptions::default());
        tracker.begin_processing().expect("pending to processing");
        assert!(tracker.available_actions().is_empty());
        assert!(matches!(
            tracker.pause(),
            Err(OpsError::ActionNotEnabled { action: "pause" })
        ));
        assert!(matches!(
            tracker.request_cancel(),
            Err(OpsError::ActionNotEnabled { action: "cancel" })
        ));

        tracker.fail("boom").expect("fails");
        assert!(matches!(
            tracker.retry(),
            Err(OpsError::ActionNotEnabled { action: "retry" })
        ));
    }

    #[test]
    fn declining_the_cancel_gate_changes_nothing() {
        let mut tracker = submitted_tracker(all_actions());
        tracker.begin_processing().expect("pending to processing");

        tracker.request_cancel().expect("gate offered").decline();
        assert_eq!(tracker.status(), OperationState::Processing);
    }

    #[test]
    fn confirming_the_cancel_gate_cancels_and_fires_callback() {
        let cancelled = Arc::new(AtomicUsize::new(0));
        let seen = cancelled.clone();

        let mut tracker = submitted_tracker(all_actions());
        tracker.on_cancel(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        tracker.begin_processing().expect("pending to processing");

        tracker
            .request_cancel()
            .expect("gate offered")
            .confirm()
            .expect("cancel applies");
        assert_eq!(tracker.status(), OperationState::Cancelled);
        assert_eq!(cancelled.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn completion_callback_fires_exactly_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let seen = fired.clone();

        let mut tracker = submitted_tracker(all_actions());
        tracker.on_complete(move |results| {
            assert_eq!(results.len(), 1);
            seen.fetch_add(1, Ordering::SeqCst);
        });
        tracker.begin_processing().expect("pending to processing");
        tracker
            .complete(vec![DownloadLink {
                filename: "out.pdf".into(),
                download_url: "https://api.example.com/api/file?folder=f&filename=out.pdf".into(),
                file_size: 1,
                page_range: None,
            }])
            .expect("completes");

        assert!(tracker.complete(Vec::new()).is_err());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn eta_is_surfaced_only_while_processing() {
        let mut tracker = submitted_tracker(all_actions());
        tracker.set_eta_seconds(Some(30));
        assert_eq!(tracker.view().remaining_seconds, None);

        tracker.begin_processing().expect("pending to processing");
        assert_eq!(tracker.view().remaining_seconds, Some(30));

        tracker.complete(Vec::new()).expect("completes");
        assert_eq!(tracker.view().remaining_seconds, None);
    }

    #[test]
    fn batch_summary_is_distinct_from_percentage() {
        let mut tracker = submitted_tracker(all_actions());
        tracker.begin_processing().expect("pending to processing");
        tracker.report_progress(40);
        tracker.set_batch(2, 5);

        let view = tracker.view();
        assert_eq!(view.percent, 40);
        assert_eq!(view.files_summary.as_deref(), Some("2 of 5 files"));
    }

    #[test]
    fn transitions_are_published_to_the_bus() {
        let bus = EventBus::new();
        let mut stream = bus.subscribe(None);

        let mut tracker = ProgressTracker::new("compress", all_actions()).with_bus(bus);
        tracker
            .attach_input(InputFile::new("in.pdf", vec![1]))
            .expect("idle accepts inputs");
        tracker.submit().expect("idle to pending");
        tracker.begin_processing().expect("pending to processing");
        tracker.report_progress(10);
        tracker.fail("boom").expect("fails");

        let mut kinds = Vec::new();
        while let Some(envelope) = stream.try_next() {
            kinds.push(envelope.event.kind());
        }
        assert_eq!(
            kinds,
            vec![
                "operation_started",
                "state_changed",
                "state_changed",
                "progress",
                "state_changed",
                "failed"
            ]
        );
    }

    #[test]
    fn reset_returns_to_idle_and_clears_batch() {
        let mut tracker = submitted_tracker(all_actions());
        tracker.begin_processing().expect("pending to processing");
        tracker.set_batch(1, 3);
        tracker.fail("boom").expect("fails");

        tracker.reset();
        assert_eq!(tracker.status(), OperationState::Idle);
        assert!(tracker.view().files_summary.is_none());
        assert!(!tracker.has_poll());
    }
}
