use crate::{UrlError, UrlResult};
use url::Url;

/// Schemes a target may already carry; anything else gets `https://` prepended
const KNOWN_SCHEMES: &[&str] = &["http://", "https://"];

/// Normalizes a raw target string into something fetchable
///
/// Targets come from spreadsheets and are frequently bare hosts such as
/// `example.com` or `www.example.com/shop`. Surrounding whitespace is
/// trimmed, scheme-relative targets (`//example.com`) get `https:`, and any
/// target without an `http://` or `https://` prefix gets `https://`.
/// No other validation happens here; a failed fetch is how a bad target is
/// discovered.
///
/// # Examples
///
/// ```
/// use affiliate_scout::url::normalize_target;
///
/// assert_eq!(normalize_target("example.com"), "https://example.com");
/// assert_eq!(normalize_target("http://example.com"), "http://example.com");
/// ```
pub fn normalize_target(raw: &str) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();

    if KNOWN_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return trimmed.to_string();
    }

    if let Some(rest) = trimmed.strip_prefix("//") {
        return format!("https://{}", rest);
    }

    format!("https://{}", trimmed)
}

/// Normalizes and parses a target into a `Url`
///
/// # Returns
///
/// * `Ok(Url)` - An absolute http(s) URL with a host
/// * `Err(UrlError)` - The normalized target is still not a usable web URL
pub fn parse_target(raw: &str) -> UrlResult<Url> {
    let normalized = normalize_target(raw);
    let url = Url::parse(&normalized).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingHost),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_host_gets_https() {
        assert_eq!(normalize_target("example.com"), "https://example.com");
    }

    #[test]
    fn test_keeps_existing_scheme() {
        assert_eq!(
            normalize_target("http://example.com/page"),
            "http://example.com/page"
        );
        assert_eq!(
            normalize_target("https://example.com/page"),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_scheme_check_is_case_insensitive() {
        assert_eq!(normalize_target("HTTPS://Example.com"), "HTTPS://Example.com");
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(normalize_target("  example.com \n"), "https://example.com");
    }

    #[test]
    fn test_scheme_relative_target() {
        assert_eq!(normalize_target("//example.com/x"), "https://example.com/x");
    }

    #[test]
    fn test_path_is_preserved() {
        assert_eq!(
            normalize_target("www.example.com/shop?x=1"),
            "https://www.example.com/shop?x=1"
        );
    }

    #[test]
    fn test_parse_target_ok() {
        let url = parse_target("shop.example.com").unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/");
    }

    #[test]
    fn test_parse_target_rejects_garbage() {
        assert!(parse_target("not a url at all").is_err());
        assert!(parse_target("").is_err());
    }
}
