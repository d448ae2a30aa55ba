//! Result drain — consume the result stream until closed, aggregate outcomes

use tokio::sync::mpsc;

use crate::reporter::{Event, Reporter};
use crate::types::TaskResult;

/// Aggregate outcome of one batch run
#[derive(Clone, Debug, Default)]
pub struct BatchSummary {
    /// Every result produced by the pool, in completion order
    pub results: Vec<TaskResult>,
    /// Number of successful tasks
    pub succeeded: usize,
    /// Number of failed tasks
    pub failed: usize,
}

impl BatchSummary {
    /// Total number of results (equals the batch size)
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Results that completed without error
    pub fn successes(&self) -> impl Iterator<Item = &TaskResult> {
        self.results.iter().filter(|r| r.is_success())
    }

    /// Results that carry an error
    pub fn failures(&self) -> impl Iterator<Item = &TaskResult> {
        self.results.iter().filter(|r| !r.is_success())
    }
}

/// Consume the result stream until it is closed and empty
///
/// The stream ending is exhaustion of a closed channel, never an error.
/// Each result is dispatched to the reporter as it arrives; the aggregate
/// counts do not depend on worker scheduling order.
pub(crate) async fn drain_results(
    mut results: mpsc::Receiver<TaskResult>,
    reporter: &dyn Reporter,
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    while let Some(result) = results.recv().await {
        match &result.error {
            None => {
                summary.succeeded += 1;
                reporter.report(&Event::TaskSucceeded {
                    id: result.id.clone(),
                    author: result.author.clone(),
                    size: result.size.clone(),
                    elapsed_ms: result.elapsed.as_millis() as u64,
                });
            }
            Some(error) => {
                summary.failed += 1;
                reporter.report(&Event::TaskFailed {
                    id: result.id.clone(),
                    author: result.author.clone(),
                    error: error.to_string(),
                    elapsed_ms: result.elapsed.as_millis() as u64,
                });
            }
        }
        summary.results.push(result);
    }

    reporter.report(&Event::BatchCompleted {
        succeeded: summary.succeeded,
        failed: summary.failed,
    });

    summary
}
