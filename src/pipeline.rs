//! Pipeline facade — wires the source, pool, and drain into one run
//!
//! [`ImageDownloader`] owns the configuration and the three collaborators
//! (source, handler, reporter). A run is a single batch: fetch the listing,
//! fan the tasks out across the pool, drain every result, return the
//! aggregate summary.

use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::handler::{HttpProbeHandler, TaskHandler};
use crate::pool::{self, BatchSummary};
use crate::reporter::{Event, Reporter, TracingReporter};
use crate::source::{PicsumSource, TaskSource};

/// Batch image pipeline over a worker pool
///
/// Collaborators default to the HTTP implementations
/// ([`PicsumSource`], [`HttpProbeHandler`], [`TracingReporter`]) and can be
/// replaced individually for embedding or testing.
pub struct ImageDownloader {
    config: Arc<Config>,
    source: Arc<dyn TaskSource>,
    handler: Arc<dyn TaskHandler>,
    reporter: Arc<dyn Reporter>,
}

impl std::fmt::Debug for ImageDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageDownloader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ImageDownloader {
    /// Create a pipeline instance from the given configuration
    ///
    /// Validates the configuration and, when artifact persistence is
    /// enabled, creates the artifact directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid settings and [`Error::Io`]
    /// when the artifact directory cannot be created.
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        if config.storage.persist_artifacts {
            tokio::fs::create_dir_all(&config.storage.artifact_dir)
                .await
                .map_err(|e| {
                    Error::Io(std::io::Error::new(
                        e.kind(),
                        format!(
                            "failed to create artifact directory '{}': {}",
                            config.storage.artifact_dir.display(),
                            e
                        ),
                    ))
                })?;
        }

        let source = Arc::new(PicsumSource::new(&config.source));
        let handler = Arc::new(HttpProbeHandler::new(config.storage.clone()));

        Ok(Self {
            config: Arc::new(config),
            source,
            handler,
            reporter: Arc::new(TracingReporter),
        })
    }

    /// Replace the task source
    pub fn with_source(mut self, source: Arc<dyn TaskSource>) -> Self {
        self.source = source;
        self
    }

    /// Replace the task handler
    pub fn with_handler(mut self, handler: Arc<dyn TaskHandler>) -> Self {
        self.handler = handler;
        self
    }

    /// Replace the reporting collaborator
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Run one batch to completion
    ///
    /// Fetches the listing, processes every task through the worker pool,
    /// and drains all results. A source error aborts before any pool or
    /// queue exists; per-task failures are recorded in the summary, never
    /// returned as errors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Listing`] when the source fails; nothing has been
    /// processed in that case.
    pub async fn run(&self) -> Result<BatchSummary> {
        let tasks = match self.source.fetch(self.config.source.limit).await {
            Ok(tasks) => tasks,
            Err(e) => {
                self.reporter.report(&Event::BatchAborted {
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        let num_workers = if tasks.is_empty() {
            0
        } else {
            self.config.pool.effective_workers()
        };
        self.reporter.report(&Event::BatchStarted {
            num_workers,
            num_tasks: tasks.len(),
        });

        let results = pool::run_pool(
            tasks,
            num_workers,
            self.config.pool.task_timeout,
            Arc::clone(&self.handler),
            Arc::clone(&self.reporter),
        )
        .await;

        Ok(pool::drain_results(results, self.reporter.as_ref()).await)
    }
}
