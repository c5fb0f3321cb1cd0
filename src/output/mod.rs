//! Output module for harvested links
//!
//! This module handles:
//! - Accumulating rows from concurrent page tasks in dispatch order
//! - Writing the final dataset as CSV
//! - Crawl statistics and the end-of-run summary

mod collector;
mod csv_output;
pub mod stats;
mod traits;

pub use collector::{Dataset, ExtractedRow, ResultCollector, SkippedPage};
pub use csv_output::{write_csv, CsvOutputHandler, CSV_HEADER};
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{OutputError, OutputHandler, OutputResult};
