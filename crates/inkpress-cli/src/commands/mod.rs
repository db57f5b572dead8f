//! Command handlers grouped by concern.

pub(crate) mod account;
pub(crate) mod auth;
pub(crate) mod split;
pub(crate) mod tools;
