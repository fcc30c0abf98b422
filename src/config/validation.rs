use crate::config::Config;
use crate::ConfigError;
use url::Url;

/// Validates the configuration together with the root URL the crawl will
/// be seeded with.
pub fn validate(config: &Config, root: &str) -> Result<(), ConfigError> {
    if config.workers < 1 {
        return Err(ConfigError::Validation(format!(
            "need at least one worker, got {}",
            config.workers
        )));
    }

    if config.request_timeout.is_zero() {
        return Err(ConfigError::Validation(
            "request timeout must be non-zero".to_string(),
        ));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user agent cannot be empty".to_string(),
        ));
    }

    let parsed =
        Url::parse(root).map_err(|e| ConfigError::InvalidRoot(format!("{}: {}", root, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::InvalidRoot(format!(
            "root must be http or https, got {}",
            parsed.scheme()
        )));
    }

    for prefix in &config.exclude_prefixes {
        if prefix.is_empty() {
            return Err(ConfigError::Validation(
                "exclusion prefixes cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}
