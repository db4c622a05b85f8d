use crate::config::types::{
    Config, FilterConfig, ScheduleConfig, SelectorConfig, ServerConfig, SourceConfig,
};
use crate::pipeline::ClassMatcher;
use crate::ConfigError;
use url::Url;

/// Smallest accepted fetch timeout (milliseconds)
const MIN_TIMEOUT_MS: u64 = 15_000;

/// Largest accepted fetch timeout (milliseconds)
const MAX_TIMEOUT_MS: u64 = 20_000;

/// Smallest accepted refresh interval (seconds)
const MIN_INTERVAL_SECS: u64 = 60;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_selector_config(&config.selectors)?;
    validate_filter_config(&config.filter)?;
    validate_schedule_config(&config.schedule)?;
    validate_server_config(&config.server)?;
    Ok(())
}

/// Validates the upstream source settings
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid source url '{}': {}", config.url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Source url '{}' must use http or https",
            config.url
        )));
    }

    if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&config.timeout_ms) {
        return Err(ConfigError::Validation(format!(
            "timeout_ms must be between {} and {}, got {}",
            MIN_TIMEOUT_MS, MAX_TIMEOUT_MS, config.timeout_ms
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates selector fragments by compiling each one
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    for (field, fragment) in [
        ("card", &config.card),
        ("title", &config.title),
        ("price", &config.price),
        ("offers", &config.offers),
    ] {
        ClassMatcher::new(fragment, config.match_mode)
            .compile()
            .map_err(|e| ConfigError::InvalidSelector(format!("{} selector: {}", field, e)))?;
    }
    Ok(())
}

fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    if config.region_marker.trim().is_empty() {
        return Err(ConfigError::Validation(
            "region_marker cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_schedule_config(config: &ScheduleConfig) -> Result<(), ConfigError> {
    if config.interval_secs < MIN_INTERVAL_SECS {
        return Err(ConfigError::Validation(format!(
            "interval_secs must be >= {}, got {}",
            MIN_INTERVAL_SECS, config.interval_secs
        )));
    }
    Ok(())
}

fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.host.trim().is_empty() {
        return Err(ConfigError::Validation("host cannot be empty".to_string()));
    }

    if let Some(dir) = &config.static_dir {
        if dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "static_dir cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}
