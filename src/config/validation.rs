use crate::config::types::{BotConfig, Config, FilesConfig, ForumConfig, PublisherConfig};
use crate::ConfigError;
use std::path::Path;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_bot_config(&config.bot)?;
    validate_forum_config(&config.forum)?;
    validate_publisher_config(&config.publisher)?;
    validate_files_config(&config.files)?;
    Ok(())
}

/// Validates run behavior configuration
fn validate_bot_config(config: &BotConfig) -> Result<(), ConfigError> {
    // Batch eviction drops max_history / 2 entries, which must be at least one
    if config.max_history < 2 {
        return Err(ConfigError::Validation(format!(
            "max-history must be >= 2, got {}",
            config.max_history
        )));
    }

    if config.max_message_chars < 1 {
        return Err(ConfigError::Validation(
            "max-message-chars must be >= 1".to_string(),
        ));
    }

    if config.crawl_distance == Some(0) {
        return Err(ConfigError::Validation(
            "crawl-distance must be >= 1 when set".to_string(),
        ));
    }

    if config.run_timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "run-timeout-secs must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates forum API configuration
fn validate_forum_config(config: &ForumConfig) -> Result<(), ConfigError> {
    validate_url("api-base", &config.api_base)?;

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.headline_limit < 1 || config.headline_limit > 100 {
        return Err(ConfigError::Validation(format!(
            "headline-limit must be between 1 and 100, got {}",
            config.headline_limit
        )));
    }

    if config.requests_per_minute < 1 || config.requests_per_minute > 600 {
        return Err(ConfigError::Validation(format!(
            "requests-per-minute must be between 1 and 600, got {}",
            config.requests_per_minute
        )));
    }

    for forum in &config.defaults {
        validate_forum_name(forum)?;
    }

    Ok(())
}

/// Validates publisher configuration
fn validate_publisher_config(config: &PublisherConfig) -> Result<(), ConfigError> {
    validate_url("endpoint", &config.endpoint)
}

/// Validates file locations
fn validate_files_config(config: &FilesConfig) -> Result<(), ConfigError> {
    validate_path("files.history", &config.history)?;
    validate_path("files.forums", &config.forums)?;
    validate_path("files.credentials", &config.credentials)?;
    Ok(())
}

/// Validates an http(s) URL
fn validate_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", key, value, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            key, value
        )));
    }

    Ok(())
}

/// Validates a forum identifier: non-empty, alphanumeric plus underscores
pub(crate) fn validate_forum_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::InvalidForum(
            "Forum name cannot be empty".to_string(),
        ));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ConfigError::InvalidForum(format!(
            "Forum '{}' contains invalid characters",
            name
        )));
    }

    Ok(())
}

fn validate_path(key: &str, path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", key)));
    }
    Ok(())
}
