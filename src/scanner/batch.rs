//! Batch runner: scans a list of targets politely
//!
//! This module handles:
//! - Pacing between consecutive scans (fixed delay plus optional jitter)
//! - Global concurrency limiting via a semaphore
//! - Progress reporting
//! - Keeping output in input order regardless of completion order

use crate::config::{Config, ScannerConfig};
use crate::scanner::record::SiteRecord;
use crate::scanner::site::SiteScanner;
use crate::{Result, ScanError, ScanResult};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Delay inserted between the start of consecutive scans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Fixed part of the delay
    pub min_delay: Duration,

    /// Upper bound of the random part added on top
    pub jitter: Duration,
}

impl Pacing {
    pub fn new(min_delay: Duration, jitter: Duration) -> Self {
        Self { min_delay, jitter }
    }

    pub fn from_config(config: &ScannerConfig) -> Self {
        Self::new(
            Duration::from_millis(config.min_delay_ms),
            Duration::from_millis(config.jitter_ms),
        )
    }

    /// Returns the next delay, uniformly in `min_delay..=min_delay + jitter`
    pub fn next_delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.min_delay;
        }

        let extra = rand::rng().random_range(0..=jitter_ms);
        self.min_delay + Duration::from_millis(extra)
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::from_config(&ScannerConfig::default())
    }
}

/// A target that produced no record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSite {
    /// Target as given in the input
    pub url: String,

    /// Short failure label (`timeout`, `http_status`, ...)
    pub kind: &'static str,

    /// Human-readable reason
    pub reason: String,
}

/// Records from one batch, in input order
#[derive(Debug, Clone, Default)]
pub struct ScanBatchResult {
    /// One record per successfully scanned target
    pub records: Vec<SiteRecord>,

    /// Targets that were skipped, in input order
    pub skipped: Vec<SkippedSite>,

    /// Number of targets attempted
    pub attempted: usize,
}

impl ScanBatchResult {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SiteRecord> {
        self.records.iter()
    }

    fn push(&mut self, url: String, outcome: ScanResult<SiteRecord>) {
        self.attempted += 1;
        match outcome {
            Ok(record) => self.records.push(record),
            Err(e) => self.skipped.push(SkippedSite {
                url,
                kind: e.kind(),
                reason: e.to_string(),
            }),
        }
    }
}

impl<'a> IntoIterator for &'a ScanBatchResult {
    type Item = &'a SiteRecord;
    type IntoIter = std::slice::Iter<'a, SiteRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Scans a list of targets with pacing and bounded concurrency
pub struct BatchRunner {
    scanner: SiteScanner,
    pacing: Pacing,
    max_concurrent: usize,
}

impl BatchRunner {
    /// Creates a new batch runner
    ///
    /// # Arguments
    ///
    /// * `scanner` - The site scanner shared by every task
    /// * `pacing` - Delay between consecutive scan starts
    /// * `max_concurrent` - Scans in flight at once; 1 scans strictly one after another
    pub fn new(scanner: SiteScanner, pacing: Pacing, max_concurrent: usize) -> Self {
        Self {
            scanner,
            pacing,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            SiteScanner::from_config(config)?,
            Pacing::from_config(&config.scanner),
            config.scanner.max_concurrent,
        ))
    }

    /// Scans every target, never failing as a whole
    ///
    /// Scans start in input order with the pacing delay between consecutive
    /// starts; no delay precedes the first or follows the last. With
    /// `max_concurrent == 1` each scan finishes before the delay for the next
    /// one begins. A failing or panicking scan is logged and skipped.
    ///
    /// # Arguments
    ///
    /// * `targets` - Target URLs; duplicates are scanned again
    ///
    /// # Returns
    ///
    /// Records in input order, minus skipped targets
    pub async fn scan_all<I, S>(&self, targets: I) -> ScanBatchResult
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let targets: Vec<String> = targets.into_iter().map(Into::into).collect();
        let total = targets.len();

        tracing::info!(
            "Scanning {} sites ({} at a time, {}ms min delay)",
            total,
            self.max_concurrent,
            self.pacing.min_delay.as_millis()
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut handles: Vec<(String, JoinHandle<ScanResult<SiteRecord>>)> =
            Vec::with_capacity(total);

        for (idx, target) in targets.into_iter().enumerate() {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };

            if idx > 0 {
                let delay = self.pacing.next_delay();
                tracing::debug!("Waiting {}ms before next site", delay.as_millis());
                tokio::time::sleep(delay).await;
            }

            tracing::info!("[{}/{}] Scanning {}", idx + 1, total, target);

            let scanner = self.scanner.clone();
            let task_target = target.clone();
            let handle = tokio::spawn(async move {
                let outcome = scanner.try_scan(&task_target).await;
                match &outcome {
                    Ok(record) => tracing::info!(
                        "[{}/{}] {}: {} program links, {} social links",
                        idx + 1,
                        total,
                        record.display_name,
                        record.program_links.len(),
                        record.social_link_count()
                    ),
                    Err(e) => tracing::warn!("[{}/{}] Skipping {}: {}", idx + 1, total, task_target, e),
                }
                drop(permit);
                outcome
            });

            handles.push((target, handle));
        }

        let mut result = ScanBatchResult::default();

        for (target, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    tracing::error!("Scan task for {} aborted: {}", target, join_error);
                    Err(ScanError::Aborted {
                        url: target.clone(),
                        message: join_error.to_string(),
                    })
                }
            };
            result.push(target, outcome);
        }

        tracing::info!(
            "Batch complete: {} of {} sites scanned, {} skipped",
            result.records.len(),
            result.attempted,
            result.skipped.len()
        );

        result
    }
}
