use url::Url;

/// Href prefixes that never point at a fetchable page
const SKIPPED_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Resolves an href to an absolute URL against a base
///
/// Standard relative-reference rules apply: scheme-relative (`//host/x`),
/// path-relative (`../contact`) and fragment-only (`#team`) references all
/// come back absolute.
///
/// Returns None if the link should be excluded:
/// - empty hrefs
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - hrefs that fail to resolve
/// - Non-HTTP(S) URLs after resolution
///
/// # Examples
///
/// ```
/// use affiliate_scout::url::resolve_href;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/about/").unwrap();
/// let resolved = resolve_href("../contact", &base).unwrap();
/// assert_eq!(resolved.as_str(), "https://example.com/contact");
/// ```
pub fn resolve_href(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if SKIPPED_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
    {
        return None;
    }

    base.join(href).ok().filter(is_absolute_web_url)
}

/// Checks that a URL is an absolute http(s) URL with a host
pub fn is_absolute_web_url(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty())
}
