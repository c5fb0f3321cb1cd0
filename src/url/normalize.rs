use crate::{UrlError, UrlResult};
use url::Url;

/// Normalizes a sitemap `<loc>` value into an absolute page URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject empty values
/// 2. Parse the URL; reject if malformed or relative
/// 3. Accept only http and https schemes
/// 4. Require a host
/// 5. Drop the fragment (it never reaches the server)
///
/// Host casing and default ports are normalized by the parser itself. Paths and
/// query strings are left untouched so the fetched page is exactly the one listed.
///
/// # Examples
///
/// ```
/// use link_harvest::url::normalize_page_url;
///
/// let url = normalize_page_url("  https://Blog.Example/2024/01/post.html#top ").unwrap();
/// assert_eq!(url.as_str(), "https://blog.example/2024/01/post.html");
/// ```
pub fn normalize_page_url(raw: &str) -> UrlResult<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut url = Url::parse(trimmed).map_err(|e| UrlError::Parse(format!("{}: {}", trimmed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    Ok(url)
}
