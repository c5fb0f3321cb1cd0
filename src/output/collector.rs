//! Order-preserving accumulation of extracted rows
//!
//! Page tasks finish in any order; rows are buffered per dispatch index and
//! flattened in index order when the crawl is finalized.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// One `(page, link)` pair of the dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ExtractedRow {
    #[serde(rename = "Title")]
    pub post_title: String,

    #[serde(rename = "URL")]
    pub post_url: String,

    /// Absolute URL of the link target
    #[serde(rename = "found_link")]
    pub found_link: String,
}

/// A page that contributed no rows because it could not be fetched or parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPage {
    /// Dispatch index of the page task
    pub index: usize,
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Default)]
struct Buffer {
    pages: BTreeMap<usize, Vec<ExtractedRow>>,
    skipped: BTreeMap<usize, SkippedPage>,
}

/// Collects rows from concurrent page tasks
///
/// Safe to share between tasks (`Arc<ResultCollector>`). Output order is the
/// dispatch order of pages, then document order of links within a page,
/// regardless of the order in which tasks call [`append`](Self::append).
#[derive(Debug, Default)]
pub struct ResultCollector {
    buffer: Mutex<Buffer>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one row per link for the page dispatched at `index`
    ///
    /// A page without links adds nothing.
    pub fn append(&self, index: usize, post_title: &str, post_url: &str, links: Vec<String>) {
        if links.is_empty() {
            return;
        }

        let rows = links
            .into_iter()
            .map(|found_link| ExtractedRow {
                post_title: post_title.to_string(),
                post_url: post_url.to_string(),
                found_link,
            })
            .collect::<Vec<_>>();

        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.pages.entry(index).or_default().extend(rows);
    }

    /// Records a page that was skipped
    pub fn record_skipped(&self, index: usize, url: &str, reason: &str) {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.skipped.insert(
            index,
            SkippedPage {
                index,
                url: url.to_string(),
                reason: reason.to_string(),
            },
        );
    }

    /// Number of rows buffered so far
    pub fn row_count(&self) -> usize {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.pages.values().map(Vec::len).sum()
    }

    /// Skipped pages in dispatch order
    pub fn skipped(&self) -> Vec<SkippedPage> {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.skipped.values().cloned().collect()
    }

    /// Takes the accumulated rows in dispatch order, leaving the collector empty
    pub fn finalize(&self) -> Dataset {
        let pages = {
            let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut buffer.pages)
        };

        let page_count = pages.len();
        let rows = pages.into_values().flatten().collect();

        Dataset { rows, page_count }
    }
}

/// The ordered, immutable result of a crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    rows: Vec<ExtractedRow>,
    page_count: usize,
}

impl Dataset {
    pub fn rows(&self) -> &[ExtractedRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExtractedRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of distinct pages that contributed rows
    pub fn page_count(&self) -> usize {
        self.page_count
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a ExtractedRow;
    type IntoIter = std::slice::Iter<'a, ExtractedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
