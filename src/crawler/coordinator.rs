//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives the whole pipeline:
//! - Reading the sitemap (the only fatal step)
//! - Dispatching one task per page through the rate limiter
//! - Fetching with retries, extracting links, and collecting rows
//! - Gathering statistics for the final report

use crate::config::Config;
use crate::crawler::fetcher::{fetch_with_retry, FetchOutcome, HttpFetcher, PageFetcher, RetryPolicy};
use crate::crawler::parser::extract_links;
use crate::crawler::scheduler::RateLimiter;
use crate::crawler::sitemap::read_sitemap;
use crate::output::{CrawlStatistics, Dataset, ResultCollector, SkippedPage};
use crate::HarvestError;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

/// One page to fetch, tagged with its dispatch index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTask {
    /// Position of the page in the sitemap; fixes its place in the output
    pub index: usize,
    pub url: String,
}

/// Everything a finished crawl produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub dataset: Dataset,
    pub statistics: CrawlStatistics,
    /// Pages that contributed no rows because they failed, in dispatch order
    pub skipped: Vec<SkippedPage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageOutcome {
    Harvested,
    NoLinks,
    Skipped,
}

#[derive(Debug)]
struct PageResult {
    index: usize,
    outcome: PageOutcome,
    attempts: u32,
}

/// Main crawl coordinator
///
/// Generic over the transport so the pipeline can run against any
/// [`PageFetcher`]; [`Coordinator::new`] wires in the reqwest-backed one.
pub struct Coordinator<F: PageFetcher = HttpFetcher> {
    config: Arc<Config>,
    fetcher: Arc<F>,
    limiter: RateLimiter,
    retry_policy: RetryPolicy,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::with_fetcher(config, fetcher))
    }
}

impl<F: PageFetcher> Coordinator<F> {
    /// Creates a coordinator around an existing fetcher
    pub fn with_fetcher(config: Config, fetcher: F) -> Self {
        let limiter = RateLimiter::from_config(&config.crawler);
        let retry_policy = RetryPolicy::from_config(&config.crawler);

        Self {
            config: Arc::new(config),
            fetcher: Arc::new(fetcher),
            limiter,
            retry_policy,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Runs the crawl
    ///
    /// 1. Reads the sitemap; any failure is returned before a single page is fetched
    /// 2. Spawns one task per page; each waits for a limiter slot and its delay
    /// 3. Fetches with retries; successful pages go through the link extractor
    /// 4. Waits for every task and returns the dataset in sitemap order
    pub async fn run(&self) -> Result<CrawlReport, HarvestError> {
        let urls = read_sitemap(self.fetcher.as_ref(), &self.config.crawler.sitemap_url).await?;

        let mut statistics = CrawlStatistics::start(urls.len());
        let start_time = Instant::now();
        let collector = Arc::new(ResultCollector::new());

        tracing::info!(
            "Starting to harvest {} pages with a concurrency of {}",
            urls.len(),
            self.limiter.limit()
        );

        let mut tasks = JoinSet::new();
        let mut pending = BTreeMap::new();
        for (index, url) in urls.into_iter().enumerate() {
            let task = PageTask {
                index,
                url: url.to_string(),
            };
            pending.insert(index, task.url.clone());
            tasks.spawn(process_page(
                task,
                self.fetcher.clone(),
                self.limiter.clone(),
                self.retry_policy,
                collector.clone(),
            ));
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => {
                    pending.remove(&result.index);
                    statistics.fetch_attempts += u64::from(result.attempts);
                    match result.outcome {
                        PageOutcome::Harvested => statistics.pages_harvested += 1,
                        PageOutcome::NoLinks => statistics.pages_without_links += 1,
                        PageOutcome::Skipped => statistics.pages_skipped += 1,
                    }
                }
                Err(e) => {
                    tracing::error!("Page task failed to complete: {}", e);
                    statistics.pages_skipped += 1;
                }
            }

            let completed = statistics.pages_completed();
            if completed % 10 == 0 {
                let elapsed = start_time.elapsed();
                tracing::info!(
                    "Progress: {}/{} pages done, {} rows, {:.2} pages/sec",
                    completed,
                    statistics.pages_in_sitemap,
                    collector.row_count(),
                    completed as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
                );
            }
        }

        // Whatever is still pending belongs to a task that never returned
        for (index, url) in pending {
            collector.record_skipped(index, &url, "page task did not complete");
        }

        let dataset = collector.finalize();
        let skipped = collector.skipped();
        statistics.finish(dataset.len());

        tracing::info!(
            "Harvest completed: {} of {} pages fetched, {} skipped, {} rows in {:?}",
            statistics.pages_succeeded(),
            statistics.pages_in_sitemap,
            statistics.pages_skipped,
            dataset.len(),
            start_time.elapsed()
        );

        Ok(CrawlReport {
            dataset,
            statistics,
            skipped,
        })
    }
}

/// Processes a single page task
///
/// The limiter slot is held from the politeness delay until links have been
/// appended to the collector. Every failure is logged and recorded as skipped.
async fn process_page<F: PageFetcher>(
    task: PageTask,
    fetcher: Arc<F>,
    limiter: RateLimiter,
    retry_policy: RetryPolicy,
    collector: Arc<ResultCollector>,
) -> PageResult {
    let admission = limiter.admit().await;
    tracing::trace!("Fetching {} after {:?} delay", task.url, admission.delay);

    let report = fetch_with_retry(fetcher.as_ref(), &task.url, &retry_policy).await;

    let outcome = match report.outcome {
        FetchOutcome::Success { body, final_url } => {
            if final_url != task.url {
                tracing::debug!("{} redirected to {}", task.url, final_url);
            }
            match extract_links(&task.url, &body) {
                Ok(parsed) => {
                    tracing::debug!("Found {} links on {}", parsed.links.len(), task.url);
                    let outcome = if parsed.links.is_empty() {
                        PageOutcome::NoLinks
                    } else {
                        PageOutcome::Harvested
                    };
                    collector.append(task.index, &parsed.title, &task.url, parsed.links);
                    outcome
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", task.url, e);
                    collector.record_skipped(task.index, &task.url, &e.to_string());
                    PageOutcome::Skipped
                }
            }
        }
        FetchOutcome::TransientFailure { reason } | FetchOutcome::PermanentFailure { reason } => {
            tracing::warn!(
                "Skipping {} after {} attempt(s): {}",
                task.url,
                report.attempts,
                reason
            );
            collector.record_skipped(task.index, &task.url, &reason);
            PageOutcome::Skipped
        }
    };

    drop(admission);

    PageResult {
        index: task.index,
        outcome,
        attempts: report.attempts,
    }
}
