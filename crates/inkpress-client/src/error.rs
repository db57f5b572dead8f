//! Error types for client operations.

use inkpress_api_models::ApiProblem;
use reqwest::StatusCode;
use thiserror::Error;

/// Primary error type for client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request was rejected client-side before anything was sent.
    #[error("{message}")]
    Validation {
        /// User-facing description of what to fix.
        message: String,
    },
    /// The service rejected the credentials. Persisted auth state has
    /// already been cleared and the invalidation event broadcast by the
    /// time this surfaces.
    #[error("session is no longer valid")]
    Unauthorized,
    /// The service answered with a non-success status.
    #[error("request failed with status {status}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error document, or the raw body.
        message: String,
    },
    /// The response decoded but did not carry the fields the contract
    /// requires (e.g. a split start with neither results nor a job id).
    #[error("malformed response from the service")]
    UnexpectedResponse,
    /// Transport-level failure (connect, timeout, body read, decode).
    #[error("transport error")]
    Transport(#[from] reqwest::Error),
    /// The session file could not be read or written.
    #[error("session store I/O failed")]
    SessionIo(#[from] std::io::Error),
    /// A URL could not be built from the configured base.
    #[error("invalid URL: {detail}")]
    InvalidUrl {
        /// What went wrong while joining.
        detail: String,
    },
}

impl ClientError {
    /// Convenience constructor for validation failures.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience alias for client operation results.
pub type ClientResult<T> = Result<T, ClientError>;

/// Map a non-success response into a [`ClientError`], preferring the
/// service's error document over the raw body.
///
/// `401` is handled by the caller before classification; everything else
/// lands here.
pub(crate) async fn classify(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let bytes = response.bytes().await.unwrap_or_default();

    let body_text = String::from_utf8_lossy(&bytes).to_string();
    let problem = serde_json::from_slice::<ApiProblem>(&bytes).ok();

    let message = problem.map_or_else(
        || {
            if body_text.trim().is_empty() {
                format!("request failed with status {status}")
            } else {
                body_text.trim().to_string()
            }
        },
        |p| p.error,
    );

    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Whether a status code indicates the caller should treat the session as
/// invalid.
pub(crate) const fn is_unauthorized(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED)
}
