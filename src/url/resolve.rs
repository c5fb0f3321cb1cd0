use url::Url;

/// Resolves an href against the document URL
///
/// Returns `None` when the target should not be recorded:
/// - empty (or whitespace-only) targets
/// - fragment-only targets (`#section`), which point back into the same page
/// - targets that cannot be joined into a valid URL
///
/// Any scheme that survives resolution is kept as-is; excluding `mailto:` and
/// similar links is left to whoever consumes the dataset.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) => Some(absolute),
        Err(e) => {
            tracing::debug!("Unresolvable link '{}' on {}: {}", href, base_url, e);
            None
        }
    }
}
