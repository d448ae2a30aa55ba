//! Worker loop — one task at a time, one result per task

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::handler::{TaskDeadline, TaskHandler};
use crate::reporter::{Event, Reporter};
use crate::types::{ImageTask, TaskResult};

/// Everything one worker needs for its lifetime
pub(super) struct WorkerContext {
    /// Worker index within the pool, for reporting
    pub(super) worker_id: usize,
    /// Input queue handle; each worker holds its own clone
    pub(super) tasks: async_channel::Receiver<ImageTask>,
    /// Output queue handle; dropped when the worker terminates
    pub(super) results: mpsc::Sender<TaskResult>,
    /// Per-task operation
    pub(super) handler: Arc<dyn TaskHandler>,
    /// Reporting collaborator
    pub(super) reporter: Arc<dyn Reporter>,
    /// Deadline applied to each task individually
    pub(super) task_timeout: Duration,
}

/// Run one worker until the input queue is closed and empty
///
/// That is the only normal termination path: a worker never exits early
/// while tasks remain available, and a task failing never terminates the
/// worker. Every dequeued task causes exactly one result write.
pub(super) async fn run(ctx: WorkerContext) {
    // recv() errs only once the channel is both closed and drained
    while let Ok(task) = ctx.tasks.recv().await {
        let result = process_task(&ctx, &task).await;

        if ctx.results.send(result).await.is_err() {
            // Capacity is pre-sized to the batch, so this only happens when
            // the consumer dropped the stream early
            tracing::error!(
                worker_id = ctx.worker_id,
                image_id = %task.id,
                "Result receiver dropped before the batch was drained"
            );
        }
    }

    tracing::debug!(
        worker_id = ctx.worker_id,
        "Input queue exhausted, worker terminating"
    );
}

/// Process a single task under a fresh deadline scope
async fn process_task(ctx: &WorkerContext, task: &ImageTask) -> TaskResult {
    let started = Instant::now();
    ctx.reporter.report(&Event::TaskStarted {
        worker_id: ctx.worker_id,
        id: task.id.clone(),
        author: task.author.clone(),
    });

    // Fresh per task — not shared across tasks, not shared across workers
    let deadline = TaskDeadline::new(ctx.task_timeout);

    let outcome = tokio::time::timeout(
        ctx.task_timeout,
        ctx.handler.handle(task, deadline.clone()),
    )
    .await;

    match outcome {
        Ok(Ok(summary)) => TaskResult::success(task, summary, started.elapsed()),
        Ok(Err(error)) => TaskResult::failure(task, error, started.elapsed()),
        Err(_) => {
            // The handler future was dropped at the deadline; cancel the
            // scope so any work it spawned unwinds too
            deadline.cancel();
            TaskResult::failure(task, deadline.deadline_error(&task.id), started.elapsed())
        }
    }
}
