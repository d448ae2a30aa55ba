//! Error types for image-dl
//!
//! Two layers of errors exist and they never mix:
//! - [`Error`] — batch-level failures that abort a run before (or instead of)
//!   any per-task work: bad configuration, a failed listing fetch, I/O setup.
//! - [`TaskError`] — per-task failures carried as data inside a
//!   [`TaskResult`](crate::types::TaskResult). A task failing never fails the
//!   batch, the worker that processed it, or the pool.

use std::time::Duration;
use thiserror::Error;

use crate::types::TaskId;

/// Result type alias for image-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Batch-level error type for image-dl
///
/// Any of these aborts the whole run; none of them is produced by an
/// individual task (see [`TaskError`] for those).
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "num_workers")
        key: Option<String>,
    },

    /// Listing fetch failed — the source was unavailable or returned a
    /// malformed listing. Distinct from an empty listing, which is `Ok(vec![])`.
    #[error("listing error: {0}")]
    Listing(String),

    /// I/O error (artifact directory creation)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Convenience constructor for configuration errors
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// Per-task error, carried in the task's result
///
/// These are data, not control flow: a worker records the error in the
/// [`TaskResult`](crate::types::TaskResult) it emits and moves on to the
/// next task. `Clone` because results may be fanned out to multiple
/// reporting consumers.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The probe/download request could not be completed (connection,
    /// DNS, protocol error)
    #[error("image {id} request failed: {reason}")]
    RequestFailed {
        /// Task whose request failed
        id: TaskId,
        /// Underlying transport error, stringified
        reason: String,
    },

    /// The resource responded with a non-success HTTP status
    #[error("image {id} returned status {status}")]
    UnexpectedStatus {
        /// Task whose resource returned the status
        id: TaskId,
        /// The HTTP status code received
        status: u16,
    },

    /// The per-task deadline elapsed before the handler finished
    #[error("image {id} deadline exceeded after {timeout:?}")]
    DeadlineExceeded {
        /// Task that timed out
        id: TaskId,
        /// The configured per-task timeout
        timeout: Duration,
    },

    /// Persisting the downloaded artifact to disk failed
    #[error("image {id} artifact write failed: {reason}")]
    Persist {
        /// Task whose artifact could not be written
        id: TaskId,
        /// Underlying filesystem error, stringified
        reason: String,
    },
}

impl TaskError {
    /// The task this error belongs to
    pub fn task_id(&self) -> &TaskId {
        match self {
            TaskError::RequestFailed { id, .. }
            | TaskError::UnexpectedStatus { id, .. }
            | TaskError::DeadlineExceeded { id, .. }
            | TaskError::Persist { id, .. } => id,
        }
    }

    /// Whether this error was caused by the per-task deadline
    pub fn is_deadline(&self) -> bool {
        matches!(self, TaskError::DeadlineExceeded { .. })
    }
}
