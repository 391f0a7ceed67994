//! HTML parser for extracting links, text, and metadata
//!
//! This module handles parsing landing pages to extract:
//! - Links with their anchor text (from `<a>` and `<area>` tags)
//! - Visible page text, for the social-handle text fallback
//! - Display name and meta description
//!
//! `scraper::Html` is not `Send`, so everything is copied out into an owned
//! [`ParsedPage`] before the document is dropped.

use crate::scanner::fetcher::RawPage;
use crate::scanner::metadata::{extract_metadata, PageMetadata};
use crate::url::resolve_href;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

/// Elements whose text is never visible
const HIDDEN_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that separate words even when the markup has no whitespace
const WORD_BREAK_ELEMENTS: &[&str] = &[
    "br", "p", "div", "li", "td", "th", "tr", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// A hyperlink found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    /// Absolute http(s) URL the link resolves to
    pub url: Url,

    /// The href attribute as written in the page
    pub href: String,

    /// Whitespace-collapsed anchor text (may be empty)
    pub text: String,
}

/// Extracted information from a landing page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// URL relative links were resolved against
    pub base_url: Url,

    /// Links in document order, duplicates included
    pub links: Vec<LinkCandidate>,

    /// Visible text content
    pub text: String,

    /// Display name and meta description
    pub metadata: PageMetadata,
}

/// Parses a fetched page
pub fn parse_page(raw: &RawPage) -> ParsedPage {
    parse_html(&raw.body, &raw.final_url)
}

/// Parses HTML content and extracts links, text and metadata
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` and `<area href="...">` anywhere in the document
/// - links with `rel="nofollow"` or `download`
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Anything that is not http(s) once resolved
///
/// A `<base href>` in the document overrides `page_url` for resolution.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `page_url` - The URL the page was served from
///
/// # Example
///
/// ```
/// use affiliate_scout::scanner::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let page_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &page_url);
/// assert_eq!(parsed.metadata.display_name, "Test");
/// assert_eq!(parsed.links[0].url.as_str(), "https://example.com/page");
/// ```
pub fn parse_html(html: &str, page_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);
    let base_url = document_base(&document, page_url);

    ParsedPage {
        links: extract_links(&document, &base_url),
        text: extract_text(&document),
        metadata: extract_metadata(&document, page_url),
        base_url,
    }
}

/// Returns the URL relative links resolve against
///
/// The first `<base href>` wins when it resolves to an http(s) URL.
pub fn document_base(document: &Html, page_url: &Url) -> Url {
    let Ok(base_selector) = Selector::parse("base[href]") else {
        return page_url.clone();
    };

    document
        .select(&base_selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| resolve_href(href, page_url))
        .unwrap_or_else(|| page_url.clone())
}

/// Extracts all usable links from the document, in document order
pub fn extract_links(document: &Html, base_url: &Url) -> Vec<LinkCandidate> {
    let mut links = Vec::new();

    let Ok(link_selector) = Selector::parse("a[href], area[href]") else {
        return links;
    };

    for element in document.select(&link_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if let Some(url) = resolve_href(href, base_url) {
            links.push(LinkCandidate {
                url,
                href: href.trim().to_string(),
                text: anchor_text(&element),
            });
        }
    }

    links
}

/// Anchor text with whitespace collapsed
///
/// Icon-only links carry their label in `aria-label`, `title`, or an
/// image `alt`; those are used when the element has no text of its own.
fn anchor_text(element: &ElementRef<'_>) -> String {
    let text = element_text(element);
    if !text.is_empty() {
        return text;
    }

    for attr in ["aria-label", "title"] {
        if let Some(label) = element.value().attr(attr) {
            let label = collapse_whitespace(label);
            if !label.is_empty() {
                return label;
            }
        }
    }

    if let Ok(img_selector) = Selector::parse("img[alt]") {
        if let Some(alt) = element
            .select(&img_selector)
            .find_map(|img| img.value().attr("alt"))
        {
            return collapse_whitespace(alt);
        }
    }

    String::new()
}

/// Extracts the visible text of the document
///
/// Text inside `script`, `style`, `noscript`, `template` and `head` is skipped.
/// Text nodes are joined with single spaces.
pub fn extract_text(document: &Html) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_TEXT_ELEMENTS.contains(&el.name()))
        });

        if !hidden {
            parts.push(text);
        }
    }

    collapse_whitespace(&parts.join(" "))
}

/// Text of an element as a reader sees it
///
/// Text nodes are concatenated as-is, so `<span>A</span>ffiliate` stays one
/// word; `<br>` and block elements break words. Whitespace is collapsed.
pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    let mut text = String::new();

    for node in element.descendants() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(el) if WORD_BREAK_ELEMENTS.contains(&el.name()) => text.push(' '),
            _ => {}
        }
    }

    collapse_whitespace(&text)
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
