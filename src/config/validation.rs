use crate::config::types::{
    ClassifierConfig, Config, FollowConfig, InputConfig, OutputConfig, ScannerConfig,
};
use crate::scanner::LinkClassifier;
use crate::{ConfigError, ConfigResult};

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_scanner_config(&config.scanner)?;
    validate_classifier_config(&config.classifier)?;
    validate_input_config(&config.input)?;
    validate_output_config(&config.output)?;
    validate_follow_config(&config.follow)?;
    Ok(())
}

/// Validates fetching and pacing settings
fn validate_scanner_config(config: &ScannerConfig) -> ConfigResult<()> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 || config.timeout_secs > 120 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and 120, got {}",
            config.timeout_secs
        )));
    }

    if config.min_delay_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "min_delay_ms must be >= 1000ms, got {}ms",
            config.min_delay_ms
        )));
    }

    if config.jitter_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "jitter_ms must be <= 60000ms, got {}ms",
            config.jitter_ms
        )));
    }

    if config.max_concurrent < 1 || config.max_concurrent > 16 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent must be between 1 and 16, got {}",
            config.max_concurrent
        )));
    }

    Ok(())
}

/// Validates the keyword table by building the classifier from it
fn validate_classifier_config(config: &ClassifierConfig) -> ConfigResult<()> {
    if config.program_keywords.is_empty() {
        return Err(ConfigError::Validation(
            "program_keywords must contain at least one keyword".to_string(),
        ));
    }

    if let Some(blank) = config
        .program_keywords
        .iter()
        .position(|k| k.trim().is_empty())
    {
        return Err(ConfigError::Validation(format!(
            "program_keywords[{}] is empty",
            blank
        )));
    }

    LinkClassifier::from_config(config)?;
    Ok(())
}

/// Validates the input source selection
fn validate_input_config(config: &InputConfig) -> ConfigResult<()> {
    if config.csv_path.is_some() && config.sheet_id.is_some() {
        return Err(ConfigError::Validation(
            "csv_path and sheet_id are mutually exclusive".to_string(),
        ));
    }

    if let Some(path) = &config.csv_path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "csv_path cannot be empty".to_string(),
            ));
        }
    }

    if let Some(sheet_id) = &config.sheet_id {
        if sheet_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "sheet_id cannot be empty".to_string(),
            ));
        }

        match &config.sheet_name {
            Some(name) if !name.trim().is_empty() => {}
            _ => {
                return Err(ConfigError::Validation(format!(
                    "sheet_name is required with sheet_id '{}'",
                    sheet_id
                )))
            }
        }
    }

    if config.column.trim().is_empty() {
        return Err(ConfigError::Validation(
            "column cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "directory cannot be empty".to_string(),
        ));
    }

    if config.file_prefix.trim().is_empty() {
        return Err(ConfigError::Validation(
            "file_prefix cannot be empty".to_string(),
        ));
    }

    if config
        .file_prefix
        .chars()
        .any(|c| c == '/' || c == '\\')
    {
        return Err(ConfigError::Validation(format!(
            "file_prefix must not contain path separators, got '{}'",
            config.file_prefix
        )));
    }

    if let Some(summary) = &config.summary_path {
        if summary.trim().is_empty() {
            return Err(ConfigError::Validation(
                "summary_path cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates follow-queue pacing and cap
fn validate_follow_config(config: &FollowConfig) -> ConfigResult<()> {
    if config.max_per_window < 1 {
        return Err(ConfigError::Validation(format!(
            "max_per_window must be >= 1, got {}",
            config.max_per_window
        )));
    }

    if config.window_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "window_secs must be >= 1, got {}",
            config.window_secs
        )));
    }

    if config.min_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "follow min_delay_ms ({}) must not exceed max_delay_ms ({})",
            config.min_delay_ms, config.max_delay_ms
        )));
    }

    Ok(())
}
