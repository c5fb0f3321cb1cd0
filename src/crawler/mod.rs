//! Crawler module for sitemap-driven link harvesting
//!
//! This module contains the core crawling logic, including:
//! - Reading the sitemap seed
//! - HTTP fetching with retry logic
//! - Rate limiting (concurrency slots and politeness delays)
//! - HTML parsing and link extraction
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;
mod sitemap;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{Coordinator, CrawlReport, PageTask};
pub use fetcher::{
    build_http_client, classify_status, fetch_with_retry, FetchOutcome, FetchReport, HttpFetcher,
    PageFetcher, RetryPolicy,
};
pub use parser::{extract_links, parse_html, ParsedPage};
pub use scheduler::{Admission, RateLimiter};
pub use sitemap::{parse_sitemap, read_sitemap};

use crate::config::Config;
use crate::output::Dataset;
use crate::HarvestError;

/// Runs a complete crawl and returns the harvested dataset
///
/// This is the main entry point for a crawl. It will:
/// 1. Build the shared HTTP client
/// 2. Read the sitemap (fatal on failure; nothing else is fetched)
/// 3. Fetch every listed page through the rate limiter, retrying transient failures
/// 4. Extract links and collect rows in sitemap order
///
/// Pages that fail are logged and skipped; they do not fail the crawl.
///
/// # Example
///
/// ```no_run
/// use link_harvest::config::Config;
/// use link_harvest::crawler::crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::for_sitemap("https://blog.example/sitemap.xml");
/// let dataset = crawl(&config).await?;
/// println!("{} links harvested", dataset.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: &Config) -> Result<Dataset, HarvestError> {
    let coordinator = Coordinator::new(config.clone())?;
    Ok(coordinator.run().await?.dataset)
}
