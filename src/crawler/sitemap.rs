//! Sitemap reader
//!
//! Fetches the crawl seed and turns its `<urlset>` into an ordered,
//! de-duplicated list of page URLs. Any failure here is fatal to the crawl.

use crate::crawler::fetcher::{FetchOutcome, PageFetcher};
use crate::url::{dedupe_preserving_order, normalize_page_url};
use crate::HarvestError;
use quick_xml::events::Event;
use quick_xml::Reader;
use url::Url;

/// Fetches and parses the sitemap at `sitemap_url`
///
/// The sitemap is requested exactly once; there is no retry at this layer.
///
/// # Returns
///
/// * `Ok(Vec<Url>)` - Page URLs in first-seen order, without duplicates
/// * `Err(HarvestError::SitemapFetch)` - The sitemap could not be retrieved
/// * `Err(HarvestError::SitemapParse)` - The document is not a well-formed `<urlset>`
pub async fn read_sitemap<F: PageFetcher>(
    fetcher: &F,
    sitemap_url: &str,
) -> Result<Vec<Url>, HarvestError> {
    tracing::info!("Fetching sitemap from: {}", sitemap_url);

    let body = match fetcher.attempt(sitemap_url).await {
        FetchOutcome::Success { body, .. } => body,
        FetchOutcome::TransientFailure { reason } | FetchOutcome::PermanentFailure { reason } => {
            return Err(HarvestError::SitemapFetch {
                url: sitemap_url.to_string(),
                reason,
            })
        }
    };

    let locations = parse_sitemap(&body).map_err(|message| HarvestError::SitemapParse {
        url: sitemap_url.to_string(),
        message,
    })?;

    let mut urls = Vec::with_capacity(locations.len());
    for location in locations {
        match normalize_page_url(&location) {
            Ok(url) => urls.push(url),
            Err(e) => tracing::warn!("Skipping sitemap entry '{}': {}", location, e),
        }
    }

    let total = urls.len();
    let urls = dedupe_preserving_order(urls);
    if urls.len() < total {
        tracing::debug!("Dropped {} duplicate sitemap entries", total - urls.len());
    }

    tracing::info!("Found {} URLs in the sitemap", urls.len());
    Ok(urls)
}

/// Extracts the raw `<loc>` values of a `<urlset>` document
///
/// Element names are matched on their local part, so both the default sitemap
/// namespace and prefixed forms (`<sm:loc>`) are accepted. Only `loc` elements
/// that are direct children of `url` entries are collected.
pub fn parse_sitemap(xml: &[u8]) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut root_seen = false;
    let mut current_loc: Option<String> = None;
    let mut locations = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| format!("malformed XML at byte {}: {}", reader.buffer_position(), e))?;

        match event {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if stack.is_empty() {
                    check_root(&name, root_seen)?;
                    root_seen = true;
                }
                if is_loc_in_url(&stack, &name) {
                    current_loc = Some(String::new());
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                let name = e.local_name().as_ref().to_vec();
                if stack.is_empty() {
                    check_root(&name, root_seen)?;
                    root_seen = true;
                }
            }
            Event::End(_) => {
                let name = stack
                    .pop()
                    .ok_or_else(|| "unexpected closing tag".to_string())?;
                if name == b"loc" {
                    if let Some(loc) = current_loc.take() {
                        locations.push(loc.trim().to_string());
                    }
                }
            }
            Event::Text(t) => {
                if let Some(loc) = current_loc.as_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| format!("invalid text in <loc>: {}", e))?;
                    loc.push_str(&text);
                } else if stack.is_empty() && !t.iter().all(u8::is_ascii_whitespace) {
                    return Err("text outside of the root element".to_string());
                }
            }
            Event::CData(c) => {
                if let Some(loc) = current_loc.as_mut() {
                    loc.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !root_seen {
        return Err("document has no root element".to_string());
    }
    if !stack.is_empty() {
        return Err(format!(
            "unexpected end of document inside <{}>",
            String::from_utf8_lossy(stack.last().map(Vec::as_slice).unwrap_or_default())
        ));
    }

    Ok(locations)
}

fn check_root(name: &[u8], root_seen: bool) -> Result<(), String> {
    if root_seen {
        return Err("multiple root elements".to_string());
    }
    match name {
        b"urlset" => Ok(()),
        b"sitemapindex" => Err("sitemap index documents are not supported; \
             point sitemap-url at a <urlset> sitemap"
            .to_string()),
        other => Err(format!(
            "expected <urlset> root element, found <{}>",
            String::from_utf8_lossy(other)
        )),
    }
}

fn is_loc_in_url(stack: &[Vec<u8>], name: &[u8]) -> bool {
    name == b"loc" && stack.len() == 2 && stack[1] == b"url"
}
