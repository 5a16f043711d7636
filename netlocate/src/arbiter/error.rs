//! Arbiter lifecycle errors.

use thiserror::Error;

use crate::lookup::LookupError;

/// Errors from constructing or starting an [`Arbiter`](super::Arbiter).
#[derive(Debug, Error)]
pub enum ArbiterError {
    /// `start` was called on an arbiter that is already running.
    #[error("Arbiter is already running")]
    AlreadyRunning,

    /// `start` was called outside a tokio runtime.
    #[error("No tokio runtime available: {0}")]
    NoRuntime(String),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}
