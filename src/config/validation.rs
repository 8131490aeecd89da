use crate::config::types::{Config, FetchConfig, NamingConfig, PathsConfig, ProxyConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on the concurrency ceiling
const MAX_CONCURRENT_LIMIT: usize = 1024;

const SEPARATORS: &[char] = &['/', '\\'];

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_proxy_config(&config.proxy)?;
    validate_paths_config(&config.paths)?;
    validate_naming_config(&config.naming)?;
    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.max_concurrent < 1 || config.max_concurrent > MAX_CONCURRENT_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max-concurrent must be between 1 and {}, got {}",
            MAX_CONCURRENT_LIMIT, config.max_concurrent
        )));
    }

    Ok(())
}

/// Validates proxy configuration
///
/// A configured URL must parse even when the proxy is disabled.
fn validate_proxy_config(config: &ProxyConfig) -> Result<(), ConfigError> {
    match config.url.as_deref() {
        Some(raw) if !raw.trim().is_empty() => {
            Url::parse(raw).map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid proxy url '{}': {}", raw, e))
            })?;
        }
        _ if config.enabled => {
            return Err(ConfigError::Validation(
                "proxy is enabled but no url is configured".to_string(),
            ));
        }
        _ => {}
    }

    Ok(())
}

/// Validates filesystem roots
fn validate_paths_config(config: &PathsConfig) -> Result<(), ConfigError> {
    for (name, path) in [
        ("urls-path", &config.urls_path),
        ("fail-path", &config.fail_path),
        ("storage-path", &config.storage_path),
        ("log-path", &config.log_path),
    ] {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

/// Validates the input naming template
fn validate_naming_config(config: &NamingConfig) -> Result<(), ConfigError> {
    if config.width > 20 {
        return Err(ConfigError::Validation(format!(
            "naming width must be <= 20, got {}",
            config.width
        )));
    }

    // Stems become file names, so they must not escape the urls directory
    if config.prefix.contains(SEPARATORS) || config.suffix.contains(SEPARATORS) {
        return Err(ConfigError::Validation(
            "naming prefix and suffix cannot contain path separators".to_string(),
        ));
    }

    Ok(())
}
