//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scanner, including:
//! - Building HTTP clients with a browser-like user agent
//! - GET requests to fetch landing pages
//! - Redirect handling
//! - Error classification

use crate::config::ScannerConfig;
use crate::url::{normalize_target, parse_target};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client};
use std::error::Error as _;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum redirect hops followed for a single page
const MAX_REDIRECTS: usize = 10;

/// A fetched page body ready for parsing
#[derive(Debug, Clone)]
pub struct RawPage {
    /// Final URL after redirects; relative links resolve against it
    pub final_url: Url,

    /// HTTP status code
    pub status_code: u16,

    /// Content-Type header value, if the server sent one
    pub content_type: Option<String>,

    /// Page body content
    pub body: String,
}

/// Why a page could not be fetched
#[derive(Debug, Clone, Error)]
pub enum FetchFailure {
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Could not connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },
}

impl FetchFailure {
    /// Short label used when tallying failures
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "invalid_url",
            Self::Timeout { .. } => "timeout",
            Self::Connect { .. } => "connect",
            Self::Status { .. } => "http_status",
            Self::Body { .. } => "body",
            Self::Request { .. } => "request",
        }
    }

    /// The URL the failure refers to
    pub fn url(&self) -> &str {
        match self {
            Self::InvalidUrl { url, .. }
            | Self::Timeout { url }
            | Self::Connect { url, .. }
            | Self::Status { url, .. }
            | Self::Body { url, .. }
            | Self::Request { url, .. } => url,
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The scanner configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use affiliate_scout::config::ScannerConfig;
/// use affiliate_scout::scanner::build_http_client;
///
/// let client = build_http_client(&ScannerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &ScannerConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    let timeout = Duration::from_secs(config.timeout_secs);

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a landing page
///
/// The target is normalized first (`example.com` becomes `https://example.com`).
/// Any 2xx body is returned whatever its Content-Type; a non-HTML body just
/// parses to an empty page.
///
/// # Failure Classification
///
/// | Condition | Failure |
/// |-----------|---------|
/// | Unparseable target | InvalidUrl |
/// | Timeout | Timeout |
/// | DNS failure, connection refused, TLS error | Connect |
/// | Non-2xx after redirects | Status |
/// | Body read/decode failure | Body |
/// | Redirect loop, too many redirects, anything else | Request |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `target` - The target URL as given by the operator
pub async fn fetch_page(client: &Client, target: &str) -> Result<RawPage, FetchFailure> {
    let normalized = normalize_target(target);
    let url = parse_target(target).map_err(|e| FetchFailure::InvalidUrl {
        url: normalized.clone(),
        message: e.to_string(),
    })?;

    tracing::debug!("GET {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_request_error(&normalized, &e))?;

    let status = response.status();
    let final_url = response.url().clone();

    if !status.is_success() {
        return Err(FetchFailure::Status {
            url: final_url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if let Some(content_type) = content_type.as_deref() {
        if !is_markup_content_type(content_type) {
            tracing::debug!("{} served as {}, parsing anyway", final_url, content_type);
        }
    }

    let body = response.text().await.map_err(|e| FetchFailure::Body {
        url: final_url.to_string(),
        message: error_chain(&e),
    })?;

    tracing::debug!(
        "Fetched {} ({} bytes, HTTP {})",
        final_url,
        body.len(),
        status.as_u16()
    );

    Ok(RawPage {
        final_url,
        status_code: status.as_u16(),
        content_type,
        body,
    })
}

/// Accepts HTML, XHTML/XML, and any `text/*` type
pub fn is_markup_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime.is_empty() || mime.starts_with("text/") || mime.contains("html") || mime.contains("xml")
}

fn classify_request_error(url: &str, error: &reqwest::Error) -> FetchFailure {
    let url = url.to_string();

    if error.is_timeout() {
        FetchFailure::Timeout { url }
    } else if error.is_connect() {
        FetchFailure::Connect {
            url,
            message: error_chain(error),
        }
    } else {
        FetchFailure::Request {
            url,
            message: error_chain(error),
        }
    }
}

/// Flattens an error and its sources into one line
///
/// reqwest's top-level message is generic ("error sending request"); the
/// useful part (DNS, refused, certificate) sits further down the chain.
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }

    message
}
