//! URL handling module for Link-Harvest
//!
//! This module provides normalization of sitemap locations and resolution of
//! hyperlink targets found on fetched pages.

mod normalize;
mod resolve;

use std::collections::HashSet;
use url::Url;

// Re-export main functions
pub use normalize::normalize_page_url;
pub use resolve::resolve_link;

/// Removes repeated URLs, keeping the first occurrence of each
///
/// # Examples
///
/// ```
/// use link_harvest::url::{dedupe_preserving_order, normalize_page_url};
///
/// let urls = ["https://a.example/1", "https://a.example/2", "https://a.example/1"]
///     .iter()
///     .map(|u| normalize_page_url(u).unwrap())
///     .collect();
/// let unique = dedupe_preserving_order(urls);
/// assert_eq!(unique.len(), 2);
/// assert_eq!(unique[0].as_str(), "https://a.example/1");
/// ```
pub fn dedupe_preserving_order(urls: Vec<Url>) -> Vec<Url> {
    let mut seen = HashSet::with_capacity(urls.len());
    urls.into_iter()
        .filter(|url| seen.insert(url.as_str().to_string()))
        .collect()
}
