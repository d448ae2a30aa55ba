//! Shared test helpers: scripted handlers, recording reporter, task fixtures

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::handler::{TaskDeadline, TaskHandler};
use crate::reporter::{Event, Reporter};
use crate::types::{ImageTask, TaskId, TaskSummary};

/// What a [`StubHandler`] does for one task
#[derive(Clone, Debug)]
pub(crate) enum StubBehavior {
    /// Return a success summary immediately
    Succeed,
    /// Return a success summary after sleeping, honoring the deadline
    SucceedAfter(Duration),
    /// Fail with an UnexpectedStatus error carrying this status
    Fail(u16),
    /// Never return until the deadline fires
    Hang,
}

/// Scripted task handler for pool tests
///
/// Behaviors are keyed by task id; ids without an entry use the default.
pub(crate) struct StubHandler {
    default: StubBehavior,
    behaviors: HashMap<String, StubBehavior>,
}

impl StubHandler {
    pub(crate) fn new(default: StubBehavior) -> Self {
        Self {
            default,
            behaviors: HashMap::new(),
        }
    }

    /// Handler that succeeds instantly for every task
    pub(crate) fn succeeding() -> Self {
        Self::new(StubBehavior::Succeed)
    }

    /// Override the behavior for one task id
    pub(crate) fn with(mut self, id: &str, behavior: StubBehavior) -> Self {
        self.behaviors.insert(id.to_string(), behavior);
        self
    }
}

#[async_trait]
impl TaskHandler for StubHandler {
    async fn handle(
        &self,
        task: &ImageTask,
        deadline: TaskDeadline,
    ) -> std::result::Result<TaskSummary, TaskError> {
        let behavior = self
            .behaviors
            .get(task.id.as_str())
            .unwrap_or(&self.default);

        match behavior {
            StubBehavior::Succeed => Ok(TaskSummary {
                size: task.dimensions(),
                artifact: None,
            }),
            StubBehavior::SucceedAfter(delay) => {
                tokio::select! {
                    _ = deadline.cancelled() => Err(deadline.deadline_error(&task.id)),
                    _ = tokio::time::sleep(*delay) => Ok(TaskSummary {
                        size: task.dimensions(),
                        artifact: None,
                    }),
                }
            }
            StubBehavior::Fail(status) => Err(TaskError::UnexpectedStatus {
                id: task.id.clone(),
                status: *status,
            }),
            StubBehavior::Hang => {
                deadline.cancelled().await;
                Err(deadline.deadline_error(&task.id))
            }
        }
    }
}

/// Reporter that records every event for later assertions
#[derive(Default)]
pub(crate) struct RecordingReporter {
    events: Mutex<Vec<Event>>,
}

impl RecordingReporter {
    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Count of TaskStarted events for the given task id
    pub(crate) fn started_count(&self, id: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::TaskStarted { id: tid, .. } if tid.as_str() == id))
            .count()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, event: &Event) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Build a task with the given id and fixed metadata
pub(crate) fn make_task(id: &str) -> ImageTask {
    ImageTask {
        id: TaskId::new(id),
        author: format!("author-{}", id),
        width: 640,
        height: 480,
        url: format!("https://example.com/photos/{}", id),
        download_url: format!("https://example.com/id/{}/640/480", id),
    }
}

/// Build `n` tasks with ids "0".."n-1"
pub(crate) fn make_tasks(n: usize) -> Vec<ImageTask> {
    (0..n).map(|i| make_task(&i.to_string())).collect()
}
