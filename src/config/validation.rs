use crate::config::types::{Config, CrawlConfig, EngineConfig, GeocodingConfig, SourceConfig};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_engine_config(&config.engine)?;
    validate_geocoding_config(&config.geocoding)?;
    validate_output_config(&config.output)?;
    validate_sources(&config.sources)?;
    Ok(())
}

/// Validates crawl behavior configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    if config.max_workers < 1 || config.max_workers > 16 {
        return Err(ConfigError::Validation(format!(
            "max_workers must be between 1 and 16, got {}",
            config.max_workers
        )));
    }

    // request_delay_ms = 0 is allowed; the politeness default lives in the
    // serde default, not here

    Ok(())
}

/// Validates navigation engine configuration
fn validate_engine_config(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "engine user-agent cannot be empty".to_string(),
        ));
    }

    if config.navigation_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "navigation_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.wait_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "wait_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates geocoding configuration
fn validate_geocoding_config(config: &GeocodingConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid geocoding endpoint: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "geocoding endpoint must be HTTP(S), got '{}'",
            config.endpoint
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "geocoding timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "geocoding user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the source list
fn validate_sources(sources: &[SourceConfig]) -> Result<(), ConfigError> {
    if sources.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[sources]] entry is required".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();
    for source in sources {
        validate_source(source)?;

        if !seen_names.insert(source.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source name '{}'",
                source.name
            )));
        }
    }

    Ok(())
}

/// Validates a single source entry
fn validate_source(source: &SourceConfig) -> Result<(), ConfigError> {
    if source.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "source name cannot be empty".to_string(),
        ));
    }

    let url = Url::parse(&source.url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid URL for source '{}': {}", source.name, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "source '{}' URL must be HTTP(S)",
            source.name
        )));
    }

    // The walker appends its own page parameter; a pre-existing one would
    // produce ambiguous page URLs
    if url.query_pairs().any(|(key, _)| key == "page") {
        return Err(ConfigError::Validation(format!(
            "source '{}' URL must not already carry a 'page' parameter",
            source.name
        )));
    }

    if source.page_size < 1 {
        return Err(ConfigError::Validation(format!(
            "source '{}' page-size must be >= 1",
            source.name
        )));
    }

    Ok(())
}
