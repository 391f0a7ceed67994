use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use affiliate_scout::config::load_config;
///
/// let config = load_config(Path::new("scout.toml")).unwrap();
/// println!("Minimum delay: {}ms", config.scanner.min_delay_ms);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a report can be traced back to the exact config revision.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> ConfigResult<String> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(Config, String)> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Platform;
    use crate::ConfigError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[scanner]
timeout-secs = 15
min-delay-ms = 2000
jitter-ms = 500
max-concurrent = 2

[classifier]
program-keywords = ["affiliate", "creator program"]
fallback-platform = "tiktok"

[input]
csv-path = "sites.csv"
column = "Website"

[output]
directory = "./out"
file-prefix = "scan"
summary-path = "./out/summary.md"

[follow]
platform = "instagram"
max-per-window = 10
window-secs = 1800
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.scanner.timeout_secs, 15);
        assert_eq!(config.scanner.min_delay_ms, 2000);
        assert_eq!(config.scanner.jitter_ms, 500);
        assert_eq!(config.scanner.max_concurrent, 2);
        assert!(config.scanner.text_fallback);
        assert_eq!(config.classifier.program_keywords.len(), 2);
        assert_eq!(config.classifier.fallback_platform, Platform::Tiktok);
        assert_eq!(config.input.csv_path.as_deref(), Some("sites.csv"));
        assert_eq!(config.input.column, "Website");
        assert_eq!(config.output.summary_path.as_deref(), Some("./out/summary.md"));
        assert_eq!(config.follow.max_per_window, 10);
        assert_eq!(config.follow.min_delay_ms, 5000);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();

        assert_eq!(config.scanner.timeout_secs, 10);
        assert_eq!(config.scanner.min_delay_ms, 1000);
        assert_eq!(config.scanner.max_concurrent, 1);
        assert_eq!(config.classifier.program_keywords.len(), 6);
        assert_eq!(config.classifier.fallback_platform, Platform::Instagram);
        assert_eq!(config.input.column, "website_url");
        assert_eq!(config.output.file_prefix, "website_scanning_results");
        assert_eq!(config.follow.max_per_window, 20);
        assert_eq!(config.follow.window_secs, 3600);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/scout.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_platform_rejected() {
        let result = parse_config("[classifier]\nfallback-platform = \"myspace\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[scanner]
min-delay-ms = 10
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
