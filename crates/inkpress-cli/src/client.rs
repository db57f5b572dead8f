//! Shared application context and CLI-level error types.

use anyhow::anyhow;
use inkpress_client::{ApiClient, ClientError};
use inkpress_events::EventBus;

use crate::cli::OutputFormat;

/// Message shown when a request bounced with a 401 mid-session.
pub(crate) const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl From<ClientError> for CliError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Validation { message } => Self::Validation(message),
            // The session store has already been cleared and the
            // invalidation broadcast by the time this surfaces; all that is
            // left is telling the user.
            ClientError::Unauthorized => Self::Failure(anyhow!(SESSION_EXPIRED_MESSAGE)),
            other => Self::Failure(other.into()),
        }
    }
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) api: ApiClient,
    pub(crate) bus: EventBus,
    pub(crate) output: OutputFormat,
}

impl AppContext {
    /// Reject commands that need a persisted login before any request is
    /// sent, with a pointer at the fix.
    pub(crate) fn require_login(&self) -> CliResult<()> {
        if self.api.session().is_authenticated() {
            Ok(())
        } else {
            Err(CliError::validation(
                "not logged in (run `inkpress auth login` first)",
            ))
        }
    }
}
