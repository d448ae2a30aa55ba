//! Basic pipeline run example
//!
//! This example demonstrates the core functionality of image-dl:
//! - Configuring the worker pool and listing source
//! - Creating a downloader instance
//! - Running one batch to completion
//! - Inspecting per-task results and the aggregate summary

use std::time::Duration;

use image_dl::{Config, ImageDownloader, PoolConfig, SourceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    // Build configuration
    let config = Config {
        pool: PoolConfig {
            num_workers: Some(8),
            task_timeout: Duration::from_secs(4),
        },
        source: SourceConfig {
            limit: 10,
            ..Default::default()
        },
        ..Default::default()
    };

    // Create downloader instance
    let downloader = ImageDownloader::new(config).await?;

    // Run one batch: fetch the listing, probe every image, drain all results
    let summary = downloader.run().await?;

    for result in &summary.results {
        match &result.error {
            None => println!(
                "✓ {} by {} ({}) in {:?}",
                result.id, result.author, result.size, result.elapsed
            ),
            Some(error) => println!(
                "✗ {} by {}: {} in {:?}",
                result.id, result.author, error, result.elapsed
            ),
        }
    }

    println!(
        "{} of {} succeeded, {} failed",
        summary.succeeded,
        summary.total(),
        summary.failed
    );

    Ok(())
}
