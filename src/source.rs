//! Task source — fetches the batch of image tasks from a listing endpoint
//!
//! The pipeline treats the source as an external collaborator behind the
//! [`TaskSource`] trait. A source error is batch-fatal: no pool is created
//! and no task is processed. An empty listing is not an error.

use async_trait::async_trait;

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::types::ImageTask;

/// Supplier of the ordered batch of tasks to process
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Fetch up to `limit` tasks, in source order
    ///
    /// # Errors
    ///
    /// Returns [`Error::Listing`] when the listing is unavailable or
    /// malformed. `Ok(vec![])` means the source is healthy but empty.
    async fn fetch(&self, limit: usize) -> Result<Vec<ImageTask>>;
}

/// Task source backed by a Picsum-style listing endpoint
///
/// Issues `GET {listing_url}?page={page}&limit={limit}` and deserializes the
/// JSON array of image descriptors.
pub struct PicsumSource {
    client: reqwest::Client,
    listing_url: String,
    page: u32,
}

impl PicsumSource {
    /// Create a source for the configured listing endpoint
    pub fn new(config: &SourceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            listing_url: config.listing_url.clone(),
            page: config.page,
        }
    }
}

#[async_trait]
impl TaskSource for PicsumSource {
    async fn fetch(&self, limit: usize) -> Result<Vec<ImageTask>> {
        let response = self
            .client
            .get(&self.listing_url)
            .query(&[("page", self.page as u64), ("limit", limit as u64)])
            .send()
            .await
            .map_err(|e| Error::Listing(format!("failed to fetch image listing: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Listing(format!(
                "listing endpoint returned status {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Listing(format!("failed to read listing body: {}", e)))?;

        let tasks: Vec<ImageTask> = serde_json::from_str(&body)
            .map_err(|e| Error::Listing(format!("invalid listing JSON: {}", e)))?;

        tracing::debug!(count = tasks.len(), page = self.page, "Fetched image listing");
        Ok(tasks)
    }
}
