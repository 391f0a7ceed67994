//! URL handling module for Affiliate-Scout
//!
//! This module turns loosely formatted target strings into fetchable URLs,
//! resolves in-page hrefs to absolute form, and extracts hosts for display.

mod domain;
mod normalize;
mod resolve;

// Re-export main functions
pub use domain::extract_host;
pub use normalize::{normalize_target, parse_target};
pub use resolve::{is_absolute_web_url, resolve_href};
