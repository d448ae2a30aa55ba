//! Core types for image-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::TaskError;

/// Unique identifier for an image task within a batch
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Create a new TaskId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable descriptor of one unit of work: an image listed by the source.
///
/// Field names match the listing API's JSON shape, so the listing response
/// deserializes directly into a `Vec<ImageTask>`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageTask {
    /// Image identifier, unique within a batch
    pub id: TaskId,
    /// Image author
    pub author: String,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Page URL for the image
    pub url: String,
    /// Direct download URL for the image bytes
    pub download_url: String,
}

impl ImageTask {
    /// Formatted dimensions string in `WxH` form
    pub fn dimensions(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// Derived fields produced by a successful handler invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskSummary {
    /// Formatted dimensions string (`WxH`)
    pub size: String,
    /// Path of the persisted artifact, when persistence is enabled
    pub artifact: Option<PathBuf>,
}

/// Outcome record for one processed task
///
/// Exactly one of these is produced per [`ImageTask`], by the worker that
/// processed it. Failure is data: `error` is `Some` and the remaining fields
/// still describe the task.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskResult {
    /// Identifier of the originating task
    pub id: TaskId,
    /// Author carried over from the task descriptor
    pub author: String,
    /// Formatted dimensions string (`WxH`)
    pub size: String,
    /// Path of the persisted artifact, if one was written
    pub artifact: Option<PathBuf>,
    /// The error, if the task failed
    pub error: Option<TaskError>,
    /// Wall-clock time spent processing the task
    pub elapsed: Duration,
}

impl TaskResult {
    /// Build a success result from a task and its handler summary
    pub fn success(task: &ImageTask, summary: TaskSummary, elapsed: Duration) -> Self {
        Self {
            id: task.id.clone(),
            author: task.author.clone(),
            size: summary.size,
            artifact: summary.artifact,
            error: None,
            elapsed,
        }
    }

    /// Build a failure result carrying the task error
    pub fn failure(task: &ImageTask, error: TaskError, elapsed: Duration) -> Self {
        Self {
            id: task.id.clone(),
            author: task.author.clone(),
            size: task.dimensions(),
            artifact: None,
            error: Some(error),
            elapsed,
        }
    }

    /// Whether the task completed without error
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
