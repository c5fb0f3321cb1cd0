//! HTML parser for extracting a page's title and hyperlinks

use crate::url::resolve_link;
use crate::HarvestError;
use scraper::{Html, Selector};
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPage {
    /// The page title, or the page URL when the document has none
    pub title: String,

    /// Every hyperlink on the page as an absolute URL, in document order
    pub links: Vec<String>,
}

/// Parses a fetched page and extracts its title and links
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` and `<area href="...">`, in document order
/// - duplicates (de-duplication happens downstream)
/// - any scheme that resolves, including `mailto:`
///
/// **Exclude:**
/// - empty targets
/// - fragment-only targets (`#top`)
/// - targets that cannot be resolved to a URL
///
/// Relative targets are resolved against `page_url`.
///
/// # Returns
///
/// * `Ok(ParsedPage)` - Successfully parsed page (possibly with zero links)
/// * `Err(HarvestError::PageParse)` - `page_url` is not absolute, or the body is empty
///
/// # Example
///
/// ```
/// use link_harvest::crawler::extract_links;
///
/// let html = br#"<html><head><title>Post</title></head><body><a href="/about">About</a></body></html>"#;
/// let parsed = extract_links("https://blog.example/posts/a", html).unwrap();
/// assert_eq!(parsed.title, "Post");
/// assert_eq!(parsed.links, vec!["https://blog.example/about"]);
/// ```
pub fn extract_links(page_url: &str, body: &[u8]) -> Result<ParsedPage, HarvestError> {
    let base_url = Url::parse(page_url).map_err(|e| HarvestError::PageParse {
        url: page_url.to_string(),
        message: format!("invalid page URL: {}", e),
    })?;

    let html = String::from_utf8_lossy(body);
    if html.trim().is_empty() {
        return Err(HarvestError::PageParse {
            url: page_url.to_string(),
            message: "empty document".to_string(),
        });
    }

    parse_html(&html, &base_url)
}

/// Parses HTML content against an already-parsed base URL
pub fn parse_html(html: &str, base_url: &Url) -> Result<ParsedPage, HarvestError> {
    let document = Html::parse_document(html);

    let title = extract_title(&document).unwrap_or_else(|| base_url.to_string());
    let links = collect_links(&document, base_url)?;

    Ok(ParsedPage { title, links })
}

/// Extracts the page title, collapsing internal whitespace
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| {
            element
                .text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|s| !s.is_empty())
}

/// Collects every hyperlink target in document order
fn collect_links(document: &Html, base_url: &Url) -> Result<Vec<String>, HarvestError> {
    let selector = Selector::parse("a[href], area[href]").map_err(|e| HarvestError::PageParse {
        url: base_url.to_string(),
        message: format!("invalid link selector: {}", e),
    })?;

    Ok(document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .map(String::from)
        .collect())
}
