//! # image-dl
//!
//! Bounded concurrent image fetching pipeline library.
//!
//! ## Design Philosophy
//!
//! image-dl is designed to be:
//! - **Bounded** - A fixed worker pool and pre-sized queues; nothing grows
//!   with load and nothing blocks on a full channel
//! - **Deadline-driven** - Every task gets its own fresh cancellation scope;
//!   one slow image never stalls the batch
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Collaborator-based** - The listing source, per-task handler, and
//!   reporting sink are injected traits, so the core holds no global state
//!
//! ## Quick Start
//!
//! ```no_run
//! use image_dl::{Config, ImageDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = ImageDownloader::new(Config::default()).await?;
//!
//!     let summary = downloader.run().await?;
//!     println!(
//!         "{} succeeded, {} failed",
//!         summary.succeeded, summary.failed
//!     );
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline Shape
//!
//! A run fans the fetched listing out across `N` workers and fans the
//! results back into a single stream:
//!
//! ```text
//! source ─> input queue ─> worker 0..N ─> output queue ─> drain
//! ```
//!
//! Exactly one result is produced per task. The output stream is closed
//! only after every worker has terminated, so the consumer can treat the
//! end of the stream as proof that the batch is complete.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Task handler collaborator and per-task deadline scope
pub mod handler;
/// Pipeline facade tying source, pool, and drain together
pub mod pipeline;
/// Worker pool core (fan-out, fan-in, shutdown ordering)
pub mod pool;
/// Pipeline event reporting
pub mod reporter;
/// Task source collaborator
pub mod source;
/// Core types
pub mod types;
/// Artifact path utilities
pub mod utils;

// Re-export commonly used types
pub use config::{Config, FileCollisionAction, PoolConfig, SourceConfig, StorageConfig};
pub use error::{Error, Result, TaskError};
pub use handler::{HttpProbeHandler, TaskDeadline, TaskHandler};
pub use pipeline::ImageDownloader;
pub use pool::BatchSummary;
pub use reporter::{Event, NullReporter, Reporter, TracingReporter};
pub use source::{PicsumSource, TaskSource};
pub use types::{ImageTask, TaskId, TaskResult, TaskSummary};
