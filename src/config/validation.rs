use crate::config::types::{ApiConfig, Config, OutputConfig, SearchConfig};
use crate::harvest::{parse_since, MAX_PAGE_SIZE};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_search_config(&config.search)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates API access configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    if config.page_size < 1 || config.page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::Validation(format!(
            "page_size must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, config.page_size
        )));
    }

    if config.quota_wait_minutes < 1 {
        return Err(ConfigError::Validation(format!(
            "quota_wait_minutes must be >= 1, got {}",
            config.quota_wait_minutes
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Url::parse(&config.base_url).map_err(|e| {
        ConfigError::Validation(format!("Invalid base_url '{}': {}", config.base_url, e))
    })?;

    if let Some(key) = &config.api_key {
        if key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "api_key cannot be blank when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates search configuration
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    parse_since(&config.since)?;
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, path) in [
        ("video_path", &config.video_path),
        ("comment_path", &config.comment_path),
        ("channel_path", &config.channel_path),
    ] {
        if path.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    if config.extra_columns.keys().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "extra_columns cannot contain an empty column name".to_string(),
        ));
    }

    Ok(())
}
