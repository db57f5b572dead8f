//! The [`Operation`] record: one user-initiated unit of work against the
//! remote API, together with the state machine guarding its lifecycle.
//!
//! Two invariants are enforced structurally and checked by every transition:
//! results are present if and only if the operation completed, and an error
//! message is present if and only if it failed. Progress is meaningful only
//! while the operation is pending or processing and is forced to 100 on
//! completion.

use chrono::{DateTime, Utc};
use inkpress_events::OperationState;
use serde::{Deserialize, Serialize};

use crate::error::{OpsError, OpsResult};

/// One file the user attached to an operation.
///
/// The sequence of input files is frozen once submission starts so a retry
/// can re-issue the exact original request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputFile {
    /// File name shown to the user and sent as the multipart part name.
    pub name: String,
    /// Size in bytes, used for client-side validation and usage reporting.
    pub size_bytes: u64,
    /// Raw file content.
    pub bytes: Vec<u8>,
}

impl InputFile {
    /// Construct an input file from a name and its content.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let size_bytes = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        Self {
            name: name.into(),
            size_bytes,
            bytes,
        }
    }
}

/// A resolved, directly retrievable result file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadLink {
    /// Name of the produced file.
    pub filename: String,
    /// Direct download URL (already mapped through the file endpoint).
    pub download_url: String,
    /// Size of the produced file in bytes, when reported.
    pub file_size: u64,
    /// Page range covered by the file, for split results.
    pub page_range: Option<String>,
}

/// One user-initiated unit of work against the remote API.
#[derive(Debug, Clone)]
pub struct Operation {
    job_id: Option<String>,
    status: OperationState,
    progress: u8,
    input_files: Vec<InputFile>,
    results: Option<Vec<DownloadLink>>,
    error: Option<String>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl Default for Operation {
    fn default() -> Self {
        Self::new()
    }
}

impl Operation {
    /// Create an idle operation with no inputs attached yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            job_id: None,
            status: OperationState::Idle,
            progress: 0,
            input_files: Vec::new(),
            results: None,
            error: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// Remote job identifier; present only for asynchronous operations.
    #[must_use]
    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn status(&self) -> OperationState {
        self.status
    }

    /// Progress percentage. Defined as 100 once completed; meaningful only
    /// while pending or processing.
    #[must_use]
    pub const fn progress(&self) -> u8 {
        self.progress
    }

    /// Files attached to this operation.
    #[must_use]
    pub fn input_files(&self) -> &[InputFile] {
        &self.input_files
    }

    /// Result files; `Some` if and only if the operation completed.
    #[must_use]
    pub fn results(&self) -> Option<&[DownloadLink]> {
        self.results.as_deref()
    }

    /// Failure message; `Some` if and only if the operation failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// When the current attempt was submitted.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// When the current attempt reached a terminal state.
    #[must_use]
    pub const fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Wall-clock seconds between submission and now (or the terminal
    /// timestamp once one exists).
    #[must_use]
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> Option<u64> {
        let started = self.started_at?;
        let end = self.finished_at.unwrap_or(now);
        let seconds = (end - started).num_seconds();
        u64::try_from(seconds).ok()
    }

    /// Attach an input file. Only allowed before submission.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InputsFrozen`] once submission has started.
    pub fn attach_input(&mut self, file: InputFile) -> OpsResult<()> {
        if self.status != OperationState::Idle {
            return Err(OpsError::InputsFrozen);
        }
        self.input_files.push(file);
        Ok(())
    }

    /// Record the remote job identifier for an asynchronous operation.
    pub fn assign_job_id(&mut self, job_id: impl Into<String>) {
        self.job_id = Some(job_id.into());
    }

    /// `idle → pending`: the user submitted the form.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidTransition`] unless the operation is idle.
    pub fn submit(&mut self) -> OpsResult<()> {
        self.transition(OperationState::Idle, OperationState::Pending)?;
        self.progress = 0;
        self.started_at = Some(Utc::now());
        self.finished_at = None;
        Ok(())
    }

    /// `pending → processing`: the server acknowledged work has started.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidTransition`] unless the operation is pending.
    pub fn begin_processing(&mut self) -> OpsResult<()> {
        self.transition(OperationState::Pending, OperationState::Processing)
    }

    /// Report progress. Values are clamped to 100 and never move backwards;
    /// reports outside pending/processing are ignored.
    pub fn report_progress(&mut self, percent: u8) {
        if !self.status.is_active() {
            return;
        }
        let clamped = percent.min(100);
        if clamped > self.progress {
            self.progress = clamped;
        }
    }

    /// Enter the `completed` terminal state with the given results.
    ///
    /// Progress is forced to 100 regardless of the last reported value.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidTransition`] unless the operation is
    /// pending or processing.
    pub fn complete(&mut self, results: Vec<DownloadLink>) -> OpsResult<()> {
        if !self.status.is_active() {
            return Err(OpsError::InvalidTransition {
                from: self.status,
                to: OperationState::Completed,
            });
        }
        self.status = OperationState::Completed;
        self.progress = 100;
        self.results = Some(results);
        self.error = None;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Enter the `failed` terminal state with a user-facing message.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidTransition`] unless the operation is
    /// pending, processing, or paused.
    pub fn fail(&mut self, message: impl Into<String>) -> OpsResult<()> {
        if !matches!(
            self.status,
            OperationState::Pending | OperationState::Processing | OperationState::Paused
        ) {
            return Err(OpsError::InvalidTransition {
                from: self.status,
                to: OperationState::Failed,
            });
        }
        self.status = OperationState::Failed;
        self.results = None;
        self.error = Some(message.into());
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Enter the `cancelled` terminal state. Callers go through the
    /// tracker's confirmation gate; this is the raw transition.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidTransition`] unless the operation is
    /// pending, processing, or paused.
    pub fn cancel(&mut self) -> OpsResult<()> {
        if !matches!(
            self.status,
            OperationState::Pending | OperationState::Processing | OperationState::Paused
        ) {
            return Err(OpsError::InvalidTransition {
                from: self.status,
                to: OperationState::Cancelled,
            });
        }
        self.status = OperationState::Cancelled;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// `processing → paused`.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidTransition`] unless the operation is
    /// processing.
    pub fn pause(&mut self) -> OpsResult<()> {
        self.transition(OperationState::Processing, OperationState::Paused)
    }

    /// `paused → processing`.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidTransition`] unless the operation is
    /// paused.
    pub fn resume(&mut self) -> OpsResult<()> {
        self.transition(OperationState::Paused, OperationState::Processing)
    }

    /// `failed → pending`: re-issue the original request. Input files are
    /// untouched so the retry carries the exact original payload.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidTransition`] unless the operation failed.
    pub fn retry(&mut self) -> OpsResult<()> {
        self.transition(OperationState::Failed, OperationState::Pending)?;
        self.progress = 0;
        self.error = None;
        self.results = None;
        self.job_id = None;
        self.started_at = Some(Utc::now());
        self.finished_at = None;
        Ok(())
    }

    /// Reset to `idle`, dropping all attached state. Used when the user
    /// starts over with a fresh form.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn transition(&mut self, expect: OperationState, to: OperationState) -> OpsResult<()> {
        if self.status != expect {
            return Err(OpsError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(name: &str) -> DownloadLink {
        DownloadLink {
            filename: name.to_string(),
            download_url: format!("https://api.example.com/api/file?folder=f&filename={name}"),
            file_size: 10,
            page_range: None,
        }
    }

    fn submitted() -> Operation {
        let mut op = Operation::new();
        op.attach_input(InputFile::new("in.pdf", vec![1, 2, 3]))
            .expect("idle accepts inputs");
        op.submit().expect("idle to pending");
        op
    }

    #[test]
    fn happy_path_holds_result_and_error_invariants() {
        let mut op = submitted();
        assert_eq!(op.status(), OperationState::Pending);
        assert!(op.results().is_none());
        assert!(op.error().is_none());

        op.begin_processing().expect("pending to processing");
        op.report_progress(40);
        assert_eq!(op.progress(), 40);
        assert!(op.results().is_none() && op.error().is_none());

        op.complete(vec![link("out.pdf")]).expect("completes");
        assert_eq!(op.status(), OperationState::Completed);
        assert!(op.results().is_some());
        assert!(op.error().is_none());
    }

    #[test]
    fn progress_is_monotonic_and_clamped() {
        let mut op = submitted();
        op.begin_processing().expect("pending to processing");
        op.report_progress(60);
        op.report_progress(30);
        assert_eq!(op.progress(), 60);
        op.report_progress(250);
        assert_eq!(op.progress(), 100);
    }

    #[test]
    fn progress_reports_outside_active_states_are_ignored() {
        let mut op = Operation::new();
        op.report_progress(50);
        assert_eq!(op.progress(), 0);

        let mut op = submitted();
        op.begin_processing().expect("pending to processing");
        op.fail("boom").expect("fails");
        op.report_progress(90);
        assert_eq!(op.status(), OperationState::Failed);
    }

    #[test]
    fn completion_forces_progress_to_100() {
        let mut op = submitted();
        op.begin_processing().expect("pending to processing");
        op.report_progress(37);
        op.complete(Vec::new()).expect("completes");
        assert_eq!(op.progress(), 100);
    }

    #[test]
    fn failure_sets_error_and_clears_results() {
        let mut op = submitted();
        op.begin_processing().expect("pending to processing");
        op.fail("server returned 500").expect("fails");
        assert_eq!(op.status(), OperationState::Failed);
        assert_eq!(op.error(), Some("server returned 500"));
        assert!(op.results().is_none());
    }

    #[test]
    fn retry_returns_to_pending_with_inputs_intact() {
        let mut op = submitted();
        op.begin_processing().expect("pending to processing");
        op.fail("boom").expect("fails");

        op.retry().expect("failed to pending");
        assert_eq!(op.status(), OperationState::Pending);
        assert!(op.error().is_none());
        assert_eq!(op.progress(), 0);
        assert_eq!(op.input_files().len(), 1);
        assert_eq!(op.input_files()[0].name, "in.pdf");
    }

    #[test]
    fn retry_is_rejected_outside_failed() {
        let mut op = submitted();
        assert!(matches!(
            op.retry(),
            Err(OpsError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn cancel_is_allowed_from_paused() {
        let mut op = submitted();
        op.begin_processing().expect("pending to processing");
        op.pause().expect("processing to paused");
        op.cancel().expect("paused to cancelled");
        assert_eq!(op.status(), OperationState::Cancelled);
        assert!(op.results().is_none() && op.error().is_none());
    }

    #[test]
    fn terminal_states_reject_further_terminal_transitions() {
        let mut op = submitted();
        op.begin_processing().expect("pending to processing");
        op.complete(Vec::new()).expect("completes");

        assert!(op.fail("late failure").is_err());
        assert!(op.cancel().is_err());
        assert!(op.complete(Vec::new()).is_err());
    }

    #[test]
    fn inputs_freeze_at_submission() {
        let mut op = submitted();
        let err = op
            .attach_input(InputFile::new("late.pdf", vec![0]))
            .expect_err("inputs frozen");
        assert!(matches!(err, OpsError::InputsFrozen));
    }

    #[test]
    fn pause_requires_processing() {
        let mut op = submitted();
        assert!(op.pause().is_err());
        op.begin_processing().expect("pending to processing");
        op.pause().expect("processing to paused");
        op.resume().expect("paused to processing");
        assert_eq!(op.status(), OperationState::Processing);
    }

    #[test]
    fn elapsed_stops_ticking_at_terminal_states() {
        let mut op = submitted();
        op.begin_processing().expect("pending to processing");
        op.fail("boom").expect("fails");

        let finished = op.finished_at().expect("terminal timestamp");
        let later = finished + chrono::Duration::seconds(30);
        assert_eq!(op.elapsed_seconds(later), op.elapsed_seconds(finished));
    }
}
