use crate::scanner::{Platform, DEFAULT_PROGRAM_KEYWORDS};
use serde::Deserialize;

/// Desktop Chrome user agent; many storefronts block obvious bot strings
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration structure for Affiliate-Scout
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub follow: FollowConfig,
}

/// Fetching and pacing behavior
#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    /// User-Agent header sent with every page request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Minimum politeness delay between scans (milliseconds)
    #[serde(rename = "min-delay-ms", default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Upper bound of random jitter added to the delay (milliseconds)
    #[serde(rename = "jitter-ms", default)]
    pub jitter_ms: u64,

    /// Maximum number of scans in flight at once
    #[serde(rename = "max-concurrent", default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Search page text when links yield nothing for the fallback platform
    #[serde(rename = "text-fallback", default = "default_true")]
    pub text_fallback: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            min_delay_ms: default_min_delay_ms(),
            jitter_ms: 0,
            max_concurrent: default_max_concurrent(),
            text_fallback: true,
        }
    }
}

/// Link classification tables
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Keywords marking a link as an affiliate/partner program link
    #[serde(rename = "program-keywords", default = "default_program_keywords")]
    pub program_keywords: Vec<String>,

    /// Platform whose profile is searched for in free text as a fallback
    #[serde(rename = "fallback-platform", default = "default_fallback_platform")]
    pub fallback_platform: Platform,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            program_keywords: default_program_keywords(),
            fallback_platform: default_fallback_platform(),
        }
    }
}

/// Where the target list comes from
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Local CSV export of the target list
    #[serde(rename = "csv-path", default)]
    pub csv_path: Option<String>,

    /// Identifier of a shared spreadsheet
    #[serde(rename = "sheet-id", default)]
    pub sheet_id: Option<String>,

    /// Named tab within the shared spreadsheet
    #[serde(rename = "sheet-name", default)]
    pub sheet_name: Option<String>,

    /// Header of the column holding target URLs
    #[serde(default = "default_column")]
    pub column: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            csv_path: None,
            sheet_id: None,
            sheet_name: None,
            column: default_column(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the timestamped CSV report
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// File name prefix of the CSV report
    #[serde(rename = "file-prefix", default = "default_file_prefix")]
    pub file_prefix: String,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            file_prefix: default_file_prefix(),
            summary_path: None,
        }
    }
}

/// Follow-queue pacing and rate cap
#[derive(Debug, Clone, Deserialize)]
pub struct FollowConfig {
    /// Platform whose discovered profiles are queued
    #[serde(default = "default_fallback_platform")]
    pub platform: Platform,

    /// Maximum follow actions per rolling window
    #[serde(rename = "max-per-window", default = "default_max_per_window")]
    pub max_per_window: u32,

    /// Length of the rolling window (seconds)
    #[serde(rename = "window-secs", default = "default_window_secs")]
    pub window_secs: u64,

    /// Lower bound of the randomized delay between actions (milliseconds)
    #[serde(rename = "min-delay-ms", default = "default_follow_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Upper bound of the randomized delay between actions (milliseconds)
    #[serde(rename = "max-delay-ms", default = "default_follow_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Wait for the window to free up instead of deferring the rest
    #[serde(rename = "wait-for-window", default)]
    pub wait_for_window: bool,
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            platform: default_fallback_platform(),
            max_per_window: default_max_per_window(),
            window_secs: default_window_secs(),
            min_delay_ms: default_follow_min_delay_ms(),
            max_delay_ms: default_follow_max_delay_ms(),
            wait_for_window: false,
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_min_delay_ms() -> u64 {
    1000
}

fn default_max_concurrent() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_program_keywords() -> Vec<String> {
    DEFAULT_PROGRAM_KEYWORDS
        .iter()
        .map(|k| k.to_string())
        .collect()
}

fn default_fallback_platform() -> Platform {
    Platform::Instagram
}

fn default_column() -> String {
    "website_url".to_string()
}

fn default_output_directory() -> String {
    "./reports".to_string()
}

fn default_file_prefix() -> String {
    "website_scanning_results".to_string()
}

fn default_max_per_window() -> u32 {
    20
}

fn default_window_secs() -> u64 {
    3600
}

fn default_follow_min_delay_ms() -> u64 {
    5000
}

fn default_follow_max_delay_ms() -> u64 {
    10000
}
