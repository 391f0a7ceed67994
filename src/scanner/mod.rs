//! Scanner module for visiting target sites and classifying their links
//!
//! This module contains the core scanning logic, including:
//! - HTTP fetching of landing pages
//! - HTML parsing, link and metadata extraction
//! - Program and social link classification
//! - Paced, bounded-concurrency batch scanning

mod batch;
mod classifier;
mod fetcher;
mod metadata;
mod parser;
mod record;
mod site;

pub use batch::{BatchRunner, Pacing, ScanBatchResult, SkippedSite};
pub use classifier::{LinkClassifier, Platform, DEFAULT_PROGRAM_KEYWORDS};
pub use fetcher::{build_http_client, fetch_page, is_markup_content_type, FetchFailure, RawPage};
pub use metadata::{extract_metadata, PageMetadata};
pub use parser::{document_base, extract_links, extract_text, parse_html, parse_page, LinkCandidate, ParsedPage};
pub use record::{ClassifiedLinks, SiteRecord};
pub use site::SiteScanner;

use crate::config::Config;
use crate::Result;

/// Scans every target with settings from `config`
///
/// This is the main entry point for a scan. It will:
/// 1. Build the HTTP client and classifier
/// 2. Scan each target with pacing between sites
/// 3. Return the records in input order
///
/// # Returns
///
/// * `Ok(ScanBatchResult)` - The batch ran (individual sites may have been skipped)
/// * `Err(ScoutError)` - The client or classifier could not be built
pub async fn scan_targets(config: &Config, targets: Vec<String>) -> Result<ScanBatchResult> {
    let runner = BatchRunner::from_config(config)?;
    Ok(runner.scan_all(targets).await)
}
