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

//! Typed client for the Inkpress document-processing API.
//!
//! Layout:
//! - `client.rs`: the [`ApiClient`] with one method per consumed endpoint
//! - `backend.rs`: the [`ToolBackend`] seam tool surfaces program against
//! - `session.rs`: persisted credentials and the 401 invalidation path
//! - `validate.rs`: client-side input checks that run before any request
//! - `error.rs`: error types and response classification

pub mod backend;
pub mod client;
pub mod error;
pub mod session;
pub mod validate;

pub use backend::ToolBackend;
pub use client::{ApiClient, DEFAULT_TIMEOUT_SECS, HEADER_API_KEY};
pub use error::{ClientError, ClientResult};
pub use session::SessionStore;
