//! Target list loading
//!
//! Targets come from one column of a CSV file: either a local export or the
//! CSV view of a shared spreadsheet tab.

use crate::config::InputConfig;
use reqwest::Client;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

const SHEET_EXPORT_BASE: &str = "https://docs.google.com/spreadsheets/d";

/// Errors while loading the target list
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column '{column}' not found (available: {available})")]
    MissingColumn { column: String, available: String },

    #[error("Failed to download sheet: {0}")]
    Download(#[from] reqwest::Error),

    #[error("Sheet download returned HTTP {0}")]
    DownloadStatus(u16),

    #[error("Invalid sheet reference: {0}")]
    InvalidSheet(String),
}

/// Where the target list comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A local CSV file
    CsvFile { path: PathBuf, column: String },

    /// A tab of a shared spreadsheet, fetched as CSV
    Sheet {
        sheet_id: String,
        sheet_name: String,
        column: String,
    },

    /// Targets given directly (e.g. on the command line)
    Inline(Vec<String>),
}

impl InputSource {
    /// Picks the source named by the `[input]` section, if any
    pub fn from_config(config: &InputConfig) -> Option<Self> {
        if let Some(path) = &config.csv_path {
            return Some(Self::CsvFile {
                path: PathBuf::from(path),
                column: config.column.clone(),
            });
        }

        match (&config.sheet_id, &config.sheet_name) {
            (Some(sheet_id), Some(sheet_name)) => Some(Self::Sheet {
                sheet_id: sheet_id.clone(),
                sheet_name: sheet_name.clone(),
                column: config.column.clone(),
            }),
            _ => None,
        }
    }

    /// Short description for logs
    pub fn describe(&self) -> String {
        match self {
            Self::CsvFile { path, column } => format!("{} (column '{}')", path.display(), column),
            Self::Sheet {
                sheet_id,
                sheet_name,
                column,
            } => format!("sheet {} / {} (column '{}')", sheet_id, sheet_name, column),
            Self::Inline(targets) => format!("{} targets from the command line", targets.len()),
        }
    }

    /// Loads the target list
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<String>)` - Non-blank targets, trimmed, in source order
    /// * `Err(InputError)` - The source could not be read or lacks the column
    pub async fn load(&self, client: &Client) -> Result<Vec<String>, InputError> {
        match self {
            Self::CsvFile { path, column } => read_csv_file(path, column),
            Self::Sheet {
                sheet_id,
                sheet_name,
                column,
            } => {
                let url = sheet_csv_url(sheet_id, sheet_name)?;
                tracing::info!("Downloading target list from {}", url);

                let response = client.get(url).send().await?;
                if !response.status().is_success() {
                    return Err(InputError::DownloadStatus(response.status().as_u16()));
                }

                let body = response.bytes().await?;
                read_url_column(&body[..], column)
            }
            Self::Inline(targets) => Ok(targets
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()),
        }
    }
}

/// Builds the CSV export URL of a spreadsheet tab
pub fn sheet_csv_url(sheet_id: &str, sheet_name: &str) -> Result<Url, InputError> {
    let sheet_id = sheet_id.trim();
    if sheet_id.is_empty() || sheet_id.contains('/') {
        return Err(InputError::InvalidSheet(format!("bad sheet id '{}'", sheet_id)));
    }

    Url::parse_with_params(
        &format!("{}/{}/gviz/tq", SHEET_EXPORT_BASE, sheet_id),
        &[("tqx", "out:csv"), ("sheet", sheet_name)],
    )
    .map_err(|e| InputError::InvalidSheet(e.to_string()))
}

/// Reads the target column of a local CSV file
pub fn read_csv_file(path: &Path, column: &str) -> Result<Vec<String>, InputError> {
    let file = std::fs::File::open(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    read_url_column(file, column)
}

/// Reads one column from CSV data with a header row
///
/// The header is matched case-insensitively after trimming. Blank cells and
/// short rows are skipped; order and duplicates are kept.
pub fn read_url_column<R: Read>(reader: R, column: &str) -> Result<Vec<String>, InputError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = rdr.headers()?.clone();
    let wanted = column.trim();
    let Some(index) = headers
        .iter()
        .position(|h| h.trim().trim_start_matches('\u{feff}').eq_ignore_ascii_case(wanted))
    else {
        return Err(InputError::MissingColumn {
            column: wanted.to_string(),
            available: headers.iter().collect::<Vec<_>>().join(", "),
        });
    };

    let mut targets = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if let Some(value) = record.get(index).map(str::trim) {
            if !value.is_empty() {
                targets.push(value.to_string());
            }
        }
    }

    tracing::debug!("Read {} targets from column '{}'", targets.len(), wanted);
    Ok(targets)
}
