use crate::config::types::{Config, DownloadConfig, GatewayConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_gateway_config(&config.gateway)?;
    validate_output_config(&config.output)?;
    validate_download_config(&config.download)?;
    Ok(())
}

/// Validates gateway configuration
fn validate_gateway_config(config: &GatewayConfig) -> Result<(), ConfigError> {
    validate_base_url("api-base-url", &config.api_base_url)?;
    validate_base_url("uploads-base-url", &config.uploads_base_url)?;

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.language.is_empty() || !is_ascii_token(&config.language) {
        return Err(ConfigError::Validation(format!(
            "language must be a non-empty language code, got '{}'",
            config.language
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.cache_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "cache-path cannot be empty".to_string(),
        ));
    }

    if config.archive_extension.is_empty()
        || !config
            .archive_extension
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ConfigError::Validation(format!(
            "archive-extension must be alphanumeric, got '{}'",
            config.archive_extension
        )));
    }

    Ok(())
}

fn validate_download_config(config: &DownloadConfig) -> Result<(), ConfigError> {
    if config.retry_delay_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "retry-delay-ms must be <= 60000, got {}",
            config.retry_delay_ms
        )));
    }

    Ok(())
}

/// Validates that a base URL parses and uses an HTTP scheme
fn validate_base_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", key, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            key, value
        )));
    }

    Ok(())
}

/// Language codes look like `en`, `pt-br` or `es-la`
fn is_ascii_token(value: &str) -> bool {
    value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
