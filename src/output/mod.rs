//! Output module for scan reports
//!
//! This module handles:
//! - Exporting records as a timestamped CSV report
//! - Generating markdown summaries of a scan
//! - Computing and printing scan statistics

mod csv_output;
mod markdown;
pub mod stats;
mod traits;

pub use csv_output::{header_row, record_row, write_records, CsvReport};
pub use markdown::{format_markdown_summary, MarkdownSummary};
pub use stats::{print_statistics, ScanStatistics};
pub use traits::{ExportError, ExportResult, ReportSink, RunInfo};

use crate::config::OutputConfig;
use crate::scanner::ScanBatchResult;
use std::path::{Path, PathBuf};

/// Writes every report named by the `[output]` section
///
/// The CSV report is required and retries once in `fallback_dir`. The
/// markdown summary is optional; its failure is logged and does not fail
/// the export.
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - Paths written, CSV report first
/// * `Err(ExportError)` - The CSV report could not be written anywhere
pub fn export_reports(
    config: &OutputConfig,
    batch: &ScanBatchResult,
    run: &RunInfo,
    fallback_dir: &Path,
) -> ExportResult<Vec<PathBuf>> {
    let report = CsvReport::new(&config.directory, &config.file_prefix);
    let mut written = vec![export_csv_with_fallback(&report, batch, run, fallback_dir)?];

    let optional: Vec<Box<dyn ReportSink>> = config
        .summary_path
        .iter()
        .map(|path| Box::new(MarkdownSummary::new(path)) as Box<dyn ReportSink>)
        .collect();

    for sink in &optional {
        match sink.export(batch, run) {
            Ok(path) => written.push(path),
            Err(e) => tracing::error!("Failed to write {} report: {}", sink.name(), e),
        }
    }

    Ok(written)
}

/// Writes the CSV report, retrying once in `fallback_dir` on failure
///
/// The batch is untouched either way; only the destination changes.
///
/// # Returns
///
/// * `Ok(PathBuf)` - Where the report ended up
/// * `Err(ExportError)` - Both attempts failed (the fallback's error is returned)
pub fn export_csv_with_fallback(
    report: &CsvReport,
    batch: &ScanBatchResult,
    run: &RunInfo,
    fallback_dir: &Path,
) -> ExportResult<PathBuf> {
    match report.export(batch, run) {
        Ok(path) => Ok(path),
        Err(e) => {
            tracing::error!(
                "Export to {} failed: {}; retrying in {}",
                report.directory().display(),
                e,
                fallback_dir.display()
            );
            report.with_directory(fallback_dir).export(batch, run)
        }
    }
}
