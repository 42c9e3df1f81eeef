//! Errors raised while querying the Oozie jobs API.

use thiserror::Error;

/// Failures that end a poll cycle before anything is exported.
#[derive(Debug, Error)]
pub enum OozieError {
    /// The server answered with a non-success status.
    #[error("Oozie returned status {status} on URL: {url}")]
    Unavailable { status: u16, url: String },

    /// The query succeeded but listed no workflow jobs.
    #[error("no jobs observed in the last {depth} day(s)")]
    EmptyResultSet { depth: u32 },

    /// Connection, timeout or body decoding failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}
