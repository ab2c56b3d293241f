use crate::config::types::{Config, ProbeConfig, SearchConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// The endpoint may be left empty here; it is checked with
/// [`validate_endpoint`] once command-line overrides have been applied.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_probe_config(&config.probe)?;
    Ok(())
}

/// Validates search index configuration
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if !config.endpoint.is_empty() {
        validate_endpoint(&config.endpoint)?;
    }

    if config.page_size < 1 {
        return Err(ConfigError::Validation(format!(
            "page_size must be >= 1, got {}",
            config.page_size
        )));
    }

    if config.scroll_keep_alive.trim().is_empty() {
        return Err(ConfigError::Validation(
            "scroll_keep_alive cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates the search endpoint base URL
pub fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    if endpoint.is_empty() {
        return Err(ConfigError::Validation(
            "search endpoint is not configured (use --endpoint or [search] endpoint)".to_string(),
        ));
    }

    let url = Url::parse(endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Endpoint '{}' must use http or https",
            endpoint
        )));
    }

    if url.query().is_some() {
        return Err(ConfigError::InvalidUrl(format!(
            "Endpoint '{}' must not carry a query string",
            endpoint
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Ok(())
}

/// Validates probe configuration
fn validate_probe_config(config: &ProbeConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "probe timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if !config.default_delay.is_finite() || config.default_delay < 0.0 {
        return Err(ConfigError::Validation(format!(
            "probe default_delay must be a non-negative number, got {}",
            config.default_delay
        )));
    }

    Ok(())
}
