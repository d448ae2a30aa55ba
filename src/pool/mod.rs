//! Worker pool — fan-out of tasks across N workers, race-free fan-in of results
//!
//! The pool owns the two queues of a batch run:
//! - the input queue, a bounded MPMC channel of tasks, closed exactly once
//!   after the last task is enqueued;
//! - the output queue, a bounded channel of results, closed exactly once and
//!   only after every worker has terminated.
//!
//! The second close is the invariant the whole module exists for: a dedicated
//! watcher task awaits every worker handle and only then drops the last
//! result sender, so the output stream closing happens-after every possible
//! write to it. Consumers read results until the stream ends; the end is
//! exhaustion, never an error.

mod drain;
mod worker;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

pub use drain::BatchSummary;
pub(crate) use drain::drain_results;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::mpsc;

use crate::handler::TaskHandler;
use crate::reporter::{Event, Reporter};
use crate::types::{ImageTask, TaskResult};

/// Start a worker pool over the given batch and return the result stream
///
/// Spawns exactly `num_workers` workers (none for an empty batch), enqueues
/// every task in the order given, closes the input queue, and spawns the
/// watcher that closes the result stream once all workers have terminated.
/// Both queues are pre-sized to the batch length, so neither enqueueing tasks
/// nor emitting results can ever block on a full channel.
pub(crate) async fn run_pool(
    tasks: Vec<ImageTask>,
    num_workers: usize,
    task_timeout: Duration,
    handler: Arc<dyn TaskHandler>,
    reporter: Arc<dyn Reporter>,
) -> mpsc::Receiver<TaskResult> {
    let batch_size = tasks.len();

    let (result_tx, result_rx) = mpsc::channel(batch_size.max(1));

    // An empty batch starts no workers; dropping the only result sender
    // closes the stream immediately
    if batch_size == 0 {
        reporter.report(&Event::PoolClosed);
        return result_rx;
    }

    let (task_tx, task_rx) = async_channel::bounded(batch_size);

    let workers: Vec<_> = (0..num_workers)
        .map(|worker_id| {
            tokio::spawn(worker::run(worker::WorkerContext {
                worker_id,
                tasks: task_rx.clone(),
                results: result_tx.clone(),
                handler: Arc::clone(&handler),
                reporter: Arc::clone(&reporter),
                task_timeout,
            }))
        })
        .collect();
    drop(task_rx);

    for task in tasks {
        // Cannot block (capacity equals the batch size) and cannot fail
        // (workers never close the input queue)
        if let Err(e) = task_tx.send(task).await {
            tracing::error!(error = %e, "Input queue rejected a task");
        }
    }
    // Signals "no more tasks will arrive", not "already consumed"; workers
    // drain what remains before terminating
    task_tx.close();

    // Watcher: block until every worker has terminated, then drop the last
    // result sender. A worker panic still counts as termination, so the
    // stream always closes.
    tokio::spawn(async move {
        for join in join_all(workers).await {
            if let Err(e) = join {
                tracing::error!(error = %e, "Worker task panicked");
            }
        }
        drop(result_tx);
        reporter.report(&Event::PoolClosed);
    });

    result_rx
}
