//! Failure taxonomy for gateway and store operations
//!
//! Callers are expected to preserve the distinction between these variants:
//! the UI maps `Unauthorized` to a re-authentication prompt, `Validation` and
//! `Server` to a displayed message, and `Network`/`Decoding` to a generic
//! connectivity/format message. Nothing in this crate retries automatically.

use thiserror::Error;

/// Errors produced by the remote gateway and the sync service
#[derive(Debug, Error)]
pub enum SyncError {
    /// Bearer credential missing or rejected (HTTP 401)
    #[error("unauthorized: credential missing or rejected")]
    Unauthorized,

    /// The backend rejected the payload with structured messages (HTTP 400)
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Any other non-2xx response
    #[error("server error (status {status}): {message}")]
    Server { status: u16, message: String },

    /// Transport-level failure (connect, timeout, TLS)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A 2xx body that could not be decoded into the expected shape,
    /// or a decoded body that violates a model invariant
    #[error("decoding error: {0}")]
    Decoding(String),

    /// A multi-step operation completed a strict prefix of its steps.
    ///
    /// Specific to sequential exercise creation: `completed` of `intended`
    /// drafts were persisted before `source` stopped the loop. The persisted
    /// prefix stays in the local store; nothing is rolled back. Callers can
    /// re-issue the remainder manually.
    #[error("partial failure: {completed} of {intended} steps completed: {source}")]
    PartialFailure {
        completed: usize,
        intended: usize,
        #[source]
        source: Box<SyncError>,
    },
}

impl SyncError {
    /// Wrap a serde_json error as a decoding failure
    pub fn decoding(err: impl std::fmt::Display) -> Self {
        Self::Decoding(err.to_string())
    }
}
