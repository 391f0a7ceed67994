//! Single-site scan: fetch, parse, classify, assemble
//!
//! Every failure inside a scan is turned into a [`ScanError`] here; nothing
//! propagates past [`SiteScanner::scan`].

use crate::config::Config;
use crate::scanner::classifier::LinkClassifier;
use crate::scanner::fetcher::{build_http_client, fetch_page, RawPage};
use crate::scanner::parser::parse_page;
use crate::scanner::record::{ClassifiedLinks, SiteRecord};
use crate::state::{ScanStage, StageTracker};
use crate::url::{is_absolute_web_url, normalize_target};
use crate::{Result, ScanError, ScanResult};
use reqwest::Client;
use std::sync::Arc;

/// Scans one website at a time; cheap to clone into worker tasks
#[derive(Debug, Clone)]
pub struct SiteScanner {
    client: Client,
    classifier: Arc<LinkClassifier>,
    text_fallback: bool,
}

impl SiteScanner {
    /// Creates a scanner from an HTTP client and compiled classifier
    ///
    /// # Arguments
    ///
    /// * `client` - The HTTP client used for every fetch
    /// * `classifier` - Keyword and platform tables
    /// * `text_fallback` - Search page text for the fallback platform when links have none
    pub fn new(client: Client, classifier: LinkClassifier, text_fallback: bool) -> Self {
        Self {
            client,
            classifier: Arc::new(classifier),
            text_fallback,
        }
    }

    /// Builds the client and classifier from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_http_client(&config.scanner)?;
        let classifier = LinkClassifier::from_config(&config.classifier)?;

        Ok(Self::new(client, classifier, config.scanner.text_fallback))
    }

    /// Scans one target, reporting why no record was produced
    ///
    /// # Arguments
    ///
    /// * `target` - Target URL as given by the operator; bare hosts are accepted
    ///
    /// # Returns
    ///
    /// * `Ok(SiteRecord)` - The page was fetched and classified
    /// * `Err(ScanError)` - The site was skipped
    pub async fn try_scan(&self, target: &str) -> ScanResult<SiteRecord> {
        let mut tracker = StageTracker::start(target);

        let raw = match fetch_page(&self.client, target).await {
            Ok(raw) => raw,
            Err(failure) => {
                tracker.fail();
                return Err(failure.into());
            }
        };

        self.assemble(&mut tracker, normalize_target(target), &raw)
            .map_err(|e| {
                tracker.fail();
                e
            })
    }

    /// Scans one target, logging and swallowing any failure
    pub async fn scan(&self, target: &str) -> Option<SiteRecord> {
        match self.try_scan(target).await {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", target, e);
                None
            }
        }
    }

    /// Turns a fetched page into a record
    ///
    /// Kept synchronous: the parsed document is not `Send` and must not be
    /// held across an await point.
    fn assemble(
        &self,
        tracker: &mut StageTracker,
        record_url: String,
        raw: &RawPage,
    ) -> ScanResult<SiteRecord> {
        tracker.advance(ScanStage::Parsing)?;

        if raw.final_url.cannot_be_a_base() {
            return Err(ScanError::Parse {
                url: record_url,
                message: format!("{} cannot be used as a base URL", raw.final_url),
            });
        }

        let parsed = parse_page(raw);
        tracing::debug!(
            "{}: {} links, {} chars of text",
            record_url,
            parsed.links.len(),
            parsed.text.len()
        );

        tracker.advance(ScanStage::Classifying)?;

        let mut links = self.classifier.classify(&parsed.links);

        let fallback = self.classifier.fallback_platform();
        if self.text_fallback && !links.has_platform(fallback) {
            if let Some(url) = self.classifier.classify_text_fallback(&parsed.text) {
                tracing::debug!("{}: {} profile found in page text: {}", record_url, fallback, url);
                links.insert_social(fallback, url);
            }
        }

        check_links(&record_url, &links)?;

        tracker.advance(ScanStage::Assembled)?;

        Ok(SiteRecord::new(record_url, parsed.metadata, links))
    }
}

/// Every classified link must be an absolute http(s) URL and no platform
/// may map to an empty set
fn check_links(record_url: &str, links: &ClassifiedLinks) -> ScanResult<()> {
    if let Some(bad) = links.all_urls().find(|url| !is_absolute_web_url(url)) {
        return Err(ScanError::Classification {
            url: record_url.to_string(),
            message: format!("classified link {} is not an absolute web URL", bad),
        });
    }

    if let Some((platform, _)) = links.social_links.iter().find(|(_, set)| set.is_empty()) {
        return Err(ScanError::Classification {
            url: record_url.to_string(),
            message: format!("empty link set stored for {}", platform),
        });
    }

    Ok(())
}
