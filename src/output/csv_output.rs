//! Tabular CSV report
//!
//! One row per site record. Multi-valued cells hold one URL per line, which
//! spreadsheet tools display as a wrapped cell.

use crate::output::traits::{ExportError, ExportResult, ReportSink, RunInfo};
use crate::scanner::{Platform, ScanBatchResult, SiteRecord};
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};
use url::Url;

/// Writes `{prefix}_{YYYYmmdd_HHMMSS}.csv` into a directory
#[derive(Debug, Clone)]
pub struct CsvReport {
    directory: PathBuf,
    file_prefix: String,
}

impl CsvReport {
    pub fn new(directory: impl Into<PathBuf>, file_prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            file_prefix: file_prefix.into(),
        }
    }

    /// Same prefix, different directory
    pub fn with_directory(&self, directory: impl Into<PathBuf>) -> Self {
        Self::new(directory, self.file_prefix.clone())
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the report for a run finishing at `timestamp`
    pub fn report_path(&self, timestamp: DateTime<Utc>) -> PathBuf {
        self.directory.join(format!(
            "{}_{}.csv",
            self.file_prefix,
            timestamp.format("%Y%m%d_%H%M%S")
        ))
    }
}

impl ReportSink for CsvReport {
    fn name(&self) -> &str {
        "csv"
    }

    fn export(&self, batch: &ScanBatchResult, run: &RunInfo) -> ExportResult<PathBuf> {
        if self.file_prefix.trim().is_empty() {
            return Err(ExportError::Destination("empty file prefix".to_string()));
        }

        std::fs::create_dir_all(&self.directory).map_err(|source| ExportError::Io {
            path: self.directory.clone(),
            source,
        })?;

        let path = self.report_path(run.finished_at);
        let file = std::fs::File::create(&path).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

        write_records(file, &batch.records)?;

        tracing::info!("Wrote {} rows to {}", batch.records.len(), path.display());
        Ok(path)
    }
}

/// Report header row
pub fn header_row() -> Vec<String> {
    let mut headers = vec![
        "Website URL".to_string(),
        "Website Name".to_string(),
        "Meta Description".to_string(),
        "Program Links".to_string(),
    ];
    headers.extend(Platform::ALL.iter().map(|p| format!("{} Links", p.label())));
    headers
}

/// Cells of one record, in header order
pub fn record_row(record: &SiteRecord) -> Vec<String> {
    let mut row = vec![
        record.url.clone(),
        guard_formula(&record.display_name),
        guard_formula(&record.meta_description),
        join_urls(record.program_links.iter()),
    ];
    row.extend(
        Platform::ALL
            .iter()
            .map(|platform| join_urls(record.social_for(*platform))),
    );
    row
}

/// Writes the header and one row per record
pub fn write_records<W: Write>(writer: W, records: &[SiteRecord]) -> ExportResult<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(header_row())?;
    for record in records {
        wtr.write_record(record_row(record))?;
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Page-supplied text starting like a formula is prefixed with `'` so a
/// spreadsheet shows it as text
fn guard_formula(cell: &str) -> String {
    match cell.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{}", cell),
        _ => cell.to_string(),
    }
}

fn join_urls<'a>(urls: impl Iterator<Item = &'a Url>) -> String {
    urls.map(Url::as_str).collect::<Vec<_>>().join("\n")
}
