//! Pipeline event reporting
//!
//! The pipeline core never logs directly and holds no process-wide mutable
//! state; it emits [`Event`]s through an injected [`Reporter`]. The default
//! [`TracingReporter`] translates events into structured `tracing` records.

use serde::{Deserialize, Serialize};

use crate::types::TaskId;

/// Event emitted during a pipeline run
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A batch run started
    BatchStarted {
        /// Number of workers in the pool
        num_workers: usize,
        /// Number of tasks fetched from the source
        num_tasks: usize,
    },

    /// A worker picked up a task
    TaskStarted {
        /// Worker processing the task
        worker_id: usize,
        /// Task identifier
        id: TaskId,
        /// Image author
        author: String,
    },

    /// A task completed successfully
    TaskSucceeded {
        /// Task identifier
        id: TaskId,
        /// Image author
        author: String,
        /// Formatted dimensions string
        size: String,
        /// Processing time in milliseconds
        elapsed_ms: u64,
    },

    /// A task failed; the failure is recorded in its result
    TaskFailed {
        /// Task identifier
        id: TaskId,
        /// Image author
        author: String,
        /// Error message
        error: String,
        /// Processing time in milliseconds
        elapsed_ms: u64,
    },

    /// All workers terminated and the result stream was closed
    PoolClosed,

    /// A batch run finished and all results were drained
    BatchCompleted {
        /// Number of successful tasks
        succeeded: usize,
        /// Number of failed tasks
        failed: usize,
    },

    /// A batch run aborted before any task was processed
    BatchAborted {
        /// Abort reason
        error: String,
    },
}

/// Reporting collaborator for pipeline events
///
/// Implementations must be cheap and non-blocking; workers call `report`
/// inline on their processing path.
pub trait Reporter: Send + Sync {
    /// Report one pipeline event
    fn report(&self, event: &Event);
}

/// Default reporter that forwards events to `tracing`
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: &Event) {
        match event {
            Event::BatchStarted {
                num_workers,
                num_tasks,
            } => {
                tracing::info!(num_workers, num_tasks, "Starting image batch");
            }
            Event::TaskStarted {
                worker_id,
                id,
                author,
            } => {
                tracing::info!(
                    worker_id,
                    image_id = %id,
                    author = %author,
                    "Worker processing image"
                );
            }
            Event::TaskSucceeded {
                id,
                author,
                size,
                elapsed_ms,
            } => {
                tracing::info!(
                    image_id = %id,
                    author = %author,
                    size = %size,
                    elapsed_ms,
                    "Image processed successfully"
                );
            }
            Event::TaskFailed {
                id,
                author,
                error,
                elapsed_ms,
            } => {
                tracing::warn!(
                    image_id = %id,
                    author = %author,
                    error = %error,
                    elapsed_ms,
                    "Image processing failed"
                );
            }
            Event::PoolClosed => {
                tracing::debug!("All workers terminated, result stream closed");
            }
            Event::BatchCompleted { succeeded, failed } => {
                tracing::info!(succeeded, failed, "Image batch completed");
            }
            Event::BatchAborted { error } => {
                tracing::error!(error = %error, "Image batch aborted");
            }
        }
    }
}

/// Reporter that discards every event
#[derive(Clone, Copy, Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, _event: &Event) {}
}
