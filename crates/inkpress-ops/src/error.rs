//! Error types for operation lifecycle handling.

use inkpress_events::OperationState;
use thiserror::Error;

/// Primary error type for lifecycle and polling operations.
#[derive(Debug, Error)]
pub enum OpsError {
    /// A state transition was requested that the machine does not allow.
    #[error("invalid operation state transition")]
    InvalidTransition {
        /// State the operation was in.
        from: OperationState,
        /// State the caller tried to enter.
        to: OperationState,
    },
    /// An action was invoked in a state where it is not offered.
    #[error("action not available in the current state")]
    ActionUnavailable {
        /// Action identifier.
        action: &'static str,
        /// State the operation was in.
        state: OperationState,
    },
    /// An action was invoked that the owning screen never opted in to.
    #[error("action not enabled for this operation")]
    ActionNotEnabled {
        /// Action identifier.
        action: &'static str,
    },
    /// Input files may not change once submission has started.
    #[error("input files are frozen after submission")]
    InputsFrozen,
}

/// Convenience alias for lifecycle operation results.
pub type OpsResult<T> = Result<T, OpsError>;
