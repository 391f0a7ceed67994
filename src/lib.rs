//! Affiliate-Scout: a polite partner-program and social-profile scanner
//!
//! This crate visits a list of target websites, classifies the outbound links
//! on each landing page into social-profile links and affiliate/partner
//! program links, and aggregates the findings into a tabular report.

pub mod config;
pub mod follow;
pub mod input;
pub mod job;
pub mod output;
pub mod scanner;
pub mod state;
pub mod url;

use thiserror::Error;

/// Top-level error type for Affiliate-Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Input error: {0}")]
    Input(#[from] input::InputError),

    #[error("Export error: {0}")]
    Export(#[from] output::ExportError),

    #[error("Follow queue error: {0}")]
    Follow(#[from] follow::FollowError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid keyword pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Reasons a single site scan ends without a record
///
/// Every variant is recovered at the site scanner boundary: the batch logs it
/// and moves on to the next target.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Fetch(#[from] scanner::FetchFailure),

    #[error("HTML parse error for {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Classification error for {url}: {message}")]
    Classification { url: String, message: String },

    #[error("Invalid scan transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::ScanStage,
        to: state::ScanStage,
    },

    #[error("Scan of {url} aborted: {message}")]
    Aborted { url: String, message: String },
}

impl ScanError {
    /// Short machine-friendly label used when tallying failures
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(failure) => failure.kind(),
            Self::Parse { .. } => "parse",
            Self::Classification { .. } => "classification",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Aborted { .. } => "aborted",
        }
    }
}

/// Result type alias for Affiliate-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for a single site scan
pub type ScanResult<T> = std::result::Result<T, ScanError>;

// Re-export commonly used types
pub use config::Config;
pub use scanner::{
    BatchRunner, ClassifiedLinks, LinkClassifier, Platform, ScanBatchResult, SiteRecord,
    SiteScanner,
};
pub use state::ScanStage;
pub use url::{extract_host, normalize_target, resolve_href};
