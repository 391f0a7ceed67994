//! One complete run: load targets, scan, write reports, work the follow queue

use crate::config::Config;
use crate::follow::{
    follow_targets, run_follow_queue, FollowDriver, FollowLimiter, FollowOptions, FollowSummary,
};
use crate::input::InputSource;
use crate::output::{export_reports, RunInfo};
use crate::scanner::{build_http_client, scan_targets, ScanBatchResult};
use crate::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};

/// A finished scan and the details of the run that produced it
#[derive(Debug)]
pub struct ScanOutcome {
    pub batch: ScanBatchResult,
    pub run: RunInfo,
}

/// Loads the target list named by `source`
///
/// An empty list is not an error; the run then produces an empty report.
pub async fn load_targets(config: &Config, source: &InputSource) -> Result<Vec<String>> {
    let client = build_http_client(&config.scanner)?;
    let targets = source.load(&client).await?;

    if targets.is_empty() {
        tracing::warn!("{} yielded no URLs; the report will be empty", source.describe());
    } else {
        tracing::info!("Loaded {} targets from {}", targets.len(), source.describe());
    }

    Ok(targets)
}

/// Loads the targets and scans every one of them
///
/// # Arguments
///
/// * `config` - Validated configuration
/// * `source` - Where the targets come from
/// * `config_hash` - Hash of the config file, recorded in the run details
///
/// # Returns
///
/// * `Ok(ScanOutcome)` - The batch ran; individual sites may have been skipped
/// * `Err(ScoutError)` - Targets could not be loaded or the scanner could not be built
pub async fn run_scan(
    config: &Config,
    source: &InputSource,
    config_hash: Option<String>,
) -> Result<ScanOutcome> {
    let targets = load_targets(config, source).await?;

    let started_at = Utc::now();
    let batch = scan_targets(config, targets).await?;

    Ok(ScanOutcome {
        batch,
        run: RunInfo {
            started_at,
            finished_at: Utc::now(),
            config_hash,
            source: source.describe(),
        },
    })
}

/// Writes the configured reports for a finished scan
pub fn write_reports(
    config: &Config,
    outcome: &ScanOutcome,
    fallback_dir: &Path,
) -> Result<Vec<PathBuf>> {
    Ok(export_reports(
        &config.output,
        &outcome.batch,
        &outcome.run,
        fallback_dir,
    )?)
}

/// Queues the profiles of the `[follow]` platform and hands them to `driver`
pub async fn run_follows<D: FollowDriver>(
    config: &Config,
    batch: &ScanBatchResult,
    driver: &mut D,
) -> Result<FollowSummary> {
    let targets = follow_targets(&batch.records, config.follow.platform);
    tracing::info!(
        "{} {} profiles queued for following",
        targets.len(),
        config.follow.platform
    );

    let mut limiter = FollowLimiter::from_config(&config.follow);
    let options = FollowOptions::from_config(&config.follow);

    Ok(run_follow_queue(driver, &targets, &mut limiter, &options).await?)
}
