//! Report sink trait and run summary types
//!
//! This module defines the trait interface for exporters and the run-level
//! data handed to them alongside the scan records.

use crate::scanner::ScanBatchResult;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while exporting a report
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid report destination: {0}")]
    Destination(String),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Run-level context written next to the records
#[derive(Debug, Clone)]
pub struct RunInfo {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// SHA-256 of the config file, when one was loaded
    pub config_hash: Option<String>,

    /// Where the targets came from
    pub source: String,
}

impl RunInfo {
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds().max(0)
    }
}

/// Trait for report destinations
///
/// A sink receives the finished batch once. Implementations must not
/// modify or drop records.
pub trait ReportSink {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Writes the report
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Where the report was written
    /// * `Err(ExportError)` - The destination could not be written
    fn export(&self, batch: &ScanBatchResult, run: &RunInfo) -> ExportResult<PathBuf>;
}
