use crate::config::types::{Config, HttpConfig, ProxyConfig, RetryConfig, SitemapConfig};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_http_config(&config.http)?;
    validate_retry_config(&config.retry)?;
    validate_sitemap_config(&config.sitemap)?;
    validate_proxies(&config.proxies)?;
    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Validates retry configuration
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.direct_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "direct_attempts must be >= 1, got {}",
            config.direct_attempts
        )));
    }

    if config.proxy_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "proxy_attempts must be >= 1, got {}",
            config.proxy_attempts
        )));
    }

    Ok(())
}

/// Validates sitemap discovery configuration
fn validate_sitemap_config(config: &SitemapConfig) -> Result<(), ConfigError> {
    if config.candidates.is_empty() {
        return Err(ConfigError::Validation(
            "at least one sitemap candidate is required".to_string(),
        ));
    }

    for candidate in &config.candidates {
        if !candidate.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "sitemap candidate '{}' must be an absolute path starting with '/'",
                candidate
            )));
        }
    }

    if config.max_depth < 1 {
        return Err(ConfigError::Validation(
            "sitemap max_depth must be >= 1".to_string(),
        ));
    }

    if config.max_documents < 1 {
        return Err(ConfigError::Validation(
            "sitemap max_documents must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the relay proxy list
fn validate_proxies(proxies: &[ProxyConfig]) -> Result<(), ConfigError> {
    let mut names = HashSet::new();

    for proxy in proxies {
        if proxy.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "proxy name cannot be empty".to_string(),
            ));
        }

        if !names.insert(proxy.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate proxy name '{}'",
                proxy.name
            )));
        }

        if !proxy.template.contains("{url}") && !proxy.template.contains("{raw_url}") {
            return Err(ConfigError::Validation(format!(
                "proxy '{}' template must contain {{url}} or {{raw_url}}",
                proxy.name
            )));
        }

        let sample = proxy.proxy_url("https://example.com/");
        let url = Url::parse(&sample).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid template for proxy '{}': {}", proxy.name, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "proxy '{}' must use http or https, got {}",
                proxy.name,
                url.scheme()
            )));
        }
    }

    Ok(())
}
