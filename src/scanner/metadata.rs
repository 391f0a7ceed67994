//! Display name and meta description extraction

use crate::scanner::parser::element_text;
use crate::url::extract_host;
use scraper::{Html, Selector};
use url::Url;

/// Human-facing page details
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageMetadata {
    /// Title, else first `<h1>`, else the host; never empty
    pub display_name: String,

    /// `<meta name="description">` content, or empty
    pub meta_description: String,
}

/// Extracts the display name and meta description of a page
///
/// # Display Name Precedence
///
/// 1. `<title>` text, trimmed, if non-empty
/// 2. First `<h1>` text, trimmed, if non-empty
/// 3. Host of `url`
pub fn extract_metadata(document: &Html, url: &Url) -> PageMetadata {
    let display_name = first_text(document, "title")
        .or_else(|| first_text(document, "h1"))
        .or_else(|| extract_host(url))
        .unwrap_or_else(|| url.to_string());

    PageMetadata {
        display_name,
        meta_description: meta_description(document).unwrap_or_default(),
    }
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;

    document
        .select(&selector)
        .next()
        .map(|element| element_text(&element))
        .filter(|s| !s.is_empty())
}

/// Attribute values are matched case-insensitively (`name="Description"`)
fn meta_description(document: &Html) -> Option<String> {
    let selector = Selector::parse("meta[name][content]").ok()?;

    document
        .select(&selector)
        .find(|element| {
            element
                .value()
                .attr("name")
                .is_some_and(|name| name.trim().eq_ignore_ascii_case("description"))
        })
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
}
