#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Operation lifecycle core shared by every Inkpress tool surface.
//!
//! Layout: `model.rs` (the [`Operation`] record and its state machine),
//! `tracker.rs` (the [`ProgressTracker`] consumed by tool screens, including
//! action gating and the two-step cancel flow), `poll.rs` (the polling
//! driver for asynchronous jobs), `error.rs` (error types).

pub mod error;
pub mod model;
pub mod poll;
pub mod tracker;

pub use error::{OpsError, OpsResult};
pub use inkpress_events::OperationState;
pub use model::{DownloadLink, InputFile, Operation};
pub use poll::{DEFAULT_POLL_PERIOD, PollHandle, PollReport, StatusProbe, spawn_poll};
pub use tracker::{Action, CancelGate, ProgressTracker, ProgressView, TrackerOptions};
