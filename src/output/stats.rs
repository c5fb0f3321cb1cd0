//! Crawl statistics
//!
//! Counters gathered by the coordinator while the crawl runs, and the summary
//! printed when it finishes.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Number of unique page URLs listed in the sitemap
    pub pages_in_sitemap: usize,

    /// Pages fetched and parsed that yielded at least one link
    pub pages_harvested: usize,

    /// Pages fetched and parsed that had no links
    pub pages_without_links: usize,

    /// Pages that failed permanently or could not be parsed
    pub pages_skipped: usize,

    /// Fetch attempts across all pages, retries included
    pub fetch_attempts: u64,

    /// Rows in the final dataset
    pub rows: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl CrawlStatistics {
    pub fn start(pages_in_sitemap: usize) -> Self {
        Self {
            pages_in_sitemap,
            pages_harvested: 0,
            pages_without_links: 0,
            pages_skipped: 0,
            fetch_attempts: 0,
            rows: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Pages that reached a terminal outcome
    pub fn pages_completed(&self) -> usize {
        self.pages_harvested + self.pages_without_links + self.pages_skipped
    }

    /// Pages fetched and parsed, with or without links
    pub fn pages_succeeded(&self) -> usize {
        self.pages_harvested + self.pages_without_links
    }

    pub fn finish(&mut self, rows: usize) {
        self.rows = rows;
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration, once finished
    pub fn duration(&self) -> Option<Duration> {
        self.finished_at
            .and_then(|finished| (finished - self.started_at).to_std().ok())
    }
}

/// Prints the end-of-crawl summary to stdout
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("\n{}", "=".repeat(50));
    println!("HARVEST COMPLETE");
    println!("{}\n", "=".repeat(50));

    if let Some(duration) = stats.duration() {
        println!("Finished in {:.2} seconds", duration.as_secs_f64());
    }
    println!(
        "Fetched {} out of {} pages",
        stats.pages_succeeded(),
        stats.pages_in_sitemap
    );
    println!("  With links:    {}", stats.pages_harvested);
    println!("  Without links: {}", stats.pages_without_links);
    println!("  Skipped:       {}", stats.pages_skipped);
    println!("Fetch attempts:  {}", stats.fetch_attempts);
    println!("Rows collected:  {}", stats.rows);
}
