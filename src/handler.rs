//! Task handler — the per-task operation and its deadline scope
//!
//! Workers invoke a [`TaskHandler`] for every task they dequeue, passing a
//! fresh [`TaskDeadline`]. The handler must select on the deadline rather
//! than relying on being dropped, so it can unwind its own in-flight work
//! promptly when the deadline fires.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::StorageConfig;
use crate::error::TaskError;
use crate::types::{ImageTask, TaskId, TaskSummary};
use crate::utils::unique_artifact_path;

/// Cancellation scope bounding one task's processing time
///
/// Created fresh per task by the worker; never shared across tasks or
/// workers. The worker cancels it when the timeout elapses, and the handler
/// observes the cancellation via [`cancelled`](TaskDeadline::cancelled).
#[derive(Clone, Debug)]
pub struct TaskDeadline {
    token: CancellationToken,
    timeout: Duration,
}

impl TaskDeadline {
    /// Create a new deadline scope with the given timeout
    pub fn new(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            timeout,
        }
    }

    /// The configured timeout for this scope
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Signal that the deadline has elapsed
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the deadline has already fired
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the deadline fires; never resolves otherwise
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// The error a task should report when this deadline fires
    pub fn deadline_error(&self, id: &TaskId) -> TaskError {
        TaskError::DeadlineExceeded {
            id: id.clone(),
            timeout: self.timeout,
        }
    }
}

/// Per-task operation invoked by the worker pool
///
/// Implementations perform the actual work for one task and must honor the
/// deadline scope: once it fires, return promptly with a deadline error
/// rather than blocking.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    /// Process one task under the given deadline scope
    ///
    /// # Errors
    ///
    /// Returns a [`TaskError`] describing why the task failed. The error is
    /// recorded in the task's result; it never terminates the worker.
    async fn handle(
        &self,
        task: &ImageTask,
        deadline: TaskDeadline,
    ) -> std::result::Result<TaskSummary, TaskError>;
}

/// Handler that probes each image's download URL over HTTP
///
/// Issues a GET to the task's `download_url` and treats any non-success
/// status as a task failure. When artifact persistence is enabled, the
/// response body is written to `<artifact_dir>/<id>.jpg`, subject to the
/// configured collision action.
pub struct HttpProbeHandler {
    client: reqwest::Client,
    storage: StorageConfig,
}

impl HttpProbeHandler {
    /// Create a handler with the given storage configuration
    pub fn new(storage: StorageConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            storage,
        }
    }

    /// Write the response body to the artifact directory
    async fn persist(
        &self,
        task: &ImageTask,
        response: reqwest::Response,
        deadline: &TaskDeadline,
    ) -> std::result::Result<PathBuf, TaskError> {
        let persist_err = |e: std::io::Error| TaskError::Persist {
            id: task.id.clone(),
            reason: e.to_string(),
        };

        let target = self.storage.artifact_dir.join(format!("{}.jpg", task.id));
        let path = unique_artifact_path(&target, self.storage.file_collision)
            .map_err(persist_err)?;

        // Body read counts against the task's deadline like the probe itself
        let bytes = tokio::select! {
            _ = deadline.cancelled() => return Err(deadline.deadline_error(&task.id)),
            body = response.bytes() => body.map_err(|e| TaskError::RequestFailed {
                id: task.id.clone(),
                reason: e.to_string(),
            })?,
        };

        tokio::fs::write(&path, &bytes).await.map_err(persist_err)?;

        tracing::debug!(
            image_id = %task.id,
            path = %path.display(),
            bytes = bytes.len(),
            "Persisted image artifact"
        );
        Ok(path)
    }
}

#[async_trait]
impl TaskHandler for HttpProbeHandler {
    async fn handle(
        &self,
        task: &ImageTask,
        deadline: TaskDeadline,
    ) -> std::result::Result<TaskSummary, TaskError> {
        let request = self.client.get(&task.download_url).send();

        let response = tokio::select! {
            _ = deadline.cancelled() => return Err(deadline.deadline_error(&task.id)),
            result = request => result.map_err(|e| TaskError::RequestFailed {
                id: task.id.clone(),
                reason: e.to_string(),
            })?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(TaskError::UnexpectedStatus {
                id: task.id.clone(),
                status: status.as_u16(),
            });
        }

        let artifact = if self.storage.persist_artifacts {
            Some(self.persist(task, response, &deadline).await?)
        } else {
            None
        };

        Ok(TaskSummary {
            size: task.dimensions(),
            artifact,
        })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileCollisionAction;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn task_for(server: &MockServer, id: &str) -> ImageTask {
        ImageTask {
            id: TaskId::new(id),
            author: "Test Author".to_string(),
            width: 200,
            height: 300,
            url: format!("{}/photos/{}", server.uri(), id),
            download_url: format!("{}/id/{}/200/300", server.uri(), id),
        }
    }

    fn probe_only() -> HttpProbeHandler {
        HttpProbeHandler::new(StorageConfig::default())
    }

    fn persisting(dir: &TempDir, collision: FileCollisionAction) -> HttpProbeHandler {
        HttpProbeHandler::new(StorageConfig {
            persist_artifacts: true,
            artifact_dir: dir.path().to_path_buf(),
            file_collision: collision,
        })
    }

    #[tokio::test]
    async fn successful_probe_returns_summary_with_dimensions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/id/7/200/300"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let task = task_for(&server, "7");
        let summary = probe_only()
            .handle(&task, TaskDeadline::new(Duration::from_secs(4)))
            .await
            .unwrap();

        assert_eq!(summary.size, "200x300");
        assert_eq!(summary.artifact, None, "persistence is off by default");
    }

    #[tokio::test]
    async fn non_success_status_is_unexpected_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/id/9/200/300"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let task = task_for(&server, "9");
        let err = probe_only()
            .handle(&task, TaskDeadline::new(Duration::from_secs(4)))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            TaskError::UnexpectedStatus {
                id: TaskId::new("9"),
                status: 404,
            }
        );
    }

    #[tokio::test]
    async fn connection_failure_is_request_failed() {
        let task = ImageTask {
            id: TaskId::new("down"),
            author: "Nobody".to_string(),
            width: 1,
            height: 1,
            url: "http://127.0.0.1:1/photos/down".to_string(),
            download_url: "http://127.0.0.1:1/id/down/1/1".to_string(),
        };

        let err = probe_only()
            .handle(&task, TaskDeadline::new(Duration::from_secs(4)))
            .await
            .unwrap_err();

        assert!(matches!(err, TaskError::RequestFailed { .. }), "got: {:?}", err);
    }

    #[tokio::test]
    async fn fired_deadline_returns_deadline_error_promptly() {
        let server = MockServer::start().await;
        // The response is slow, but the deadline has already fired, so the
        // handler must not wait for it
        Mock::given(method("GET"))
            .and(path("/id/slow/200/300"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
            .mount(&server)
            .await;

        let task = task_for(&server, "slow");
        let deadline = TaskDeadline::new(Duration::from_millis(50));
        deadline.cancel();

        let started = std::time::Instant::now();
        let err = probe_only().handle(&task, deadline).await.unwrap_err();

        assert!(err.is_deadline(), "got: {:?}", err);
        assert!(
            started.elapsed() < Duration::from_secs(5),
            "handler must return promptly once the deadline fires"
        );
    }

    #[tokio::test]
    async fn persistence_writes_artifact_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/id/11/200/300"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpegdata".to_vec()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let task = task_for(&server, "11");
        let summary = persisting(&dir, FileCollisionAction::Rename)
            .handle(&task, TaskDeadline::new(Duration::from_secs(4)))
            .await
            .unwrap();

        let artifact = summary.artifact.expect("artifact path should be set");
        assert_eq!(artifact, dir.path().join("11.jpg"));
        assert_eq!(std::fs::read(&artifact).unwrap(), b"jpegdata");
    }

    #[tokio::test]
    async fn persistence_renames_on_collision() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/id/11/200/300"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"new".to_vec()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("11.jpg"), b"old").unwrap();

        let task = task_for(&server, "11");
        let summary = persisting(&dir, FileCollisionAction::Rename)
            .handle(&task, TaskDeadline::new(Duration::from_secs(4)))
            .await
            .unwrap();

        assert_eq!(summary.artifact, Some(dir.path().join("11 (1).jpg")));
        assert_eq!(
            std::fs::read(dir.path().join("11.jpg")).unwrap(),
            b"old",
            "existing artifact must be untouched"
        );
    }

    #[tokio::test]
    async fn persistence_skip_collision_fails_the_task() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/id/11/200/300"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"new".to_vec()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("11.jpg"), b"old").unwrap();

        let task = task_for(&server, "11");
        let err = persisting(&dir, FileCollisionAction::Skip)
            .handle(&task, TaskDeadline::new(Duration::from_secs(4)))
            .await
            .unwrap_err();

        assert!(matches!(err, TaskError::Persist { .. }), "got: {:?}", err);
    }

    #[tokio::test]
    async fn deadline_scope_reports_configured_timeout() {
        let deadline = TaskDeadline::new(Duration::from_secs(7));
        assert_eq!(deadline.timeout(), Duration::from_secs(7));
        assert!(!deadline.is_cancelled());

        deadline.cancel();
        assert!(deadline.is_cancelled());

        match deadline.deadline_error(&TaskId::new("z")) {
            TaskError::DeadlineExceeded { id, timeout } => {
                assert_eq!(id.as_str(), "z");
                assert_eq!(timeout, Duration::from_secs(7));
            }
            other => panic!("expected DeadlineExceeded, got: {:?}", other),
        }
    }
}
