//! Configuration types for image-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Worker pool configuration (worker count, per-task deadline)
///
/// Groups settings for the fan-out stage. Used as a nested sub-config
/// within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of concurrent workers (default: derived from available
    /// parallelism, see [`PoolConfig::effective_workers`])
    ///
    /// Must be at least 1 when set explicitly. `None` derives twice the
    /// machine's available parallelism.
    #[serde(default)]
    pub num_workers: Option<usize>,

    /// Per-task deadline (default: 4 seconds)
    ///
    /// Each task gets its own fresh deadline; one task timing out never
    /// affects another task or worker.
    #[serde(default = "default_task_timeout", with = "duration_serde")]
    pub task_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_workers: None,
            task_timeout: default_task_timeout(),
        }
    }
}

impl PoolConfig {
    /// Resolve the worker count to use for a run
    ///
    /// An explicit setting wins; otherwise twice the available parallelism,
    /// and at least 1 in all cases.
    pub fn effective_workers(&self) -> usize {
        match self.num_workers {
            Some(n) => n.max(1),
            None => std::thread::available_parallelism()
                .map(|n| n.get() * 2)
                .unwrap_or(2),
        }
    }
}

/// Listing source configuration (endpoint, pagination)
///
/// Groups settings for fetching the batch of image tasks. Used as a nested
/// sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Listing endpoint URL (default: the public Picsum listing)
    #[serde(default = "default_listing_url")]
    pub listing_url: String,

    /// Listing page to request (default: 1)
    #[serde(default = "default_page")]
    pub page: u32,

    /// Maximum number of tasks to fetch per run (default: 10)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            listing_url: default_listing_url(),
            page: default_page(),
            limit: default_limit(),
        }
    }
}

/// Artifact storage configuration
///
/// Persistence is optional: by default the pipeline only probes each image's
/// reachability. Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Persist downloaded image bytes to disk (default: false)
    #[serde(default)]
    pub persist_artifacts: bool,

    /// Directory for persisted artifacts (default: "./images")
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,

    /// How to handle an existing file at the artifact path
    #[serde(default)]
    pub file_collision: FileCollisionAction,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            persist_artifacts: false,
            artifact_dir: default_artifact_dir(),
            file_collision: FileCollisionAction::default(),
        }
    }
}

/// File collision handling strategy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCollisionAction {
    /// Append (1), (2), etc. to filename (default)
    #[default]
    Rename,
    /// Overwrite existing file
    Overwrite,
    /// Fail the task, keep existing file
    Skip,
}

/// Main configuration for the image pipeline
///
/// Fields are organized into logical sub-configs:
/// - [`pool`](PoolConfig) — worker count and per-task deadline
/// - [`source`](SourceConfig) — listing endpoint and pagination
/// - [`storage`](StorageConfig) — optional artifact persistence
///
/// All sub-config fields are flattened for serialization, so the JSON/TOML
/// format has no nesting and every field has a sensible default.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Worker pool settings
    #[serde(flatten)]
    pub pool: PoolConfig,

    /// Listing source settings
    #[serde(flatten)]
    pub source: SourceConfig,

    /// Artifact storage settings
    #[serde(flatten)]
    pub storage: StorageConfig,
}

impl Config {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the offending key when:
    /// - `num_workers` is explicitly set to 0
    /// - `listing_url` is not a parseable absolute URL
    pub fn validate(&self) -> Result<()> {
        if self.pool.num_workers == Some(0) {
            return Err(Error::config(
                "num_workers must be at least 1",
                "num_workers",
            ));
        }

        if let Err(e) = url::Url::parse(&self.source.listing_url) {
            return Err(Error::config(
                format!("invalid listing URL '{}': {}", self.source.listing_url, e),
                "listing_url",
            ));
        }

        Ok(())
    }
}

fn default_task_timeout() -> Duration {
    Duration::from_secs(4)
}

fn default_listing_url() -> String {
    "https://picsum.photos/v2/list".to_string()
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> usize {
    10
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("./images")
}

// Duration serialization helper (seconds as integer)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
