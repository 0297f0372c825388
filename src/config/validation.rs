use crate::config::types::{
    Config, HarvestConfig, OutputConfig, ReadmeConfig, SourceEntry, UserAgentConfig,
};
use crate::sources::Extractor;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_harvest_config(&config.harvest)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_readme_config(&config.readme)?;
    validate_sources(&config.sources)?;
    Ok(())
}

/// Validates fetch loop configuration
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.max_workers < 1 || config.max_workers > 32 {
        return Err(ConfigError::Validation(format!(
            "max-workers must be between 1 and 32, got {}",
            config.max_workers
        )));
    }

    if config.request_timeout_secs < 1 || config.request_timeout_secs > 120 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be between 1 and 120, got {}",
            config.request_timeout_secs
        )));
    }

    if config.max_consecutive_failures < 1 {
        return Err(ConfigError::Validation(format!(
            "max-consecutive-failures must be >= 1, got {}",
            config.max_consecutive_failures
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent name cannot be empty".to_string(),
        ));
    }

    if !config
        .name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "user-agent name must contain only ASCII alphanumerics, '-' or '_', got '{}'",
            config.name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv-path cannot be empty".to_string(),
        ));
    }

    if config.readme_path.is_empty() {
        return Err(ConfigError::Validation(
            "readme-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates README settings; the repository must look like `owner/name`
fn validate_readme_config(config: &ReadmeConfig) -> Result<(), ConfigError> {
    let mut parts = config.repository.split('/');
    let valid = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
    );
    if !valid {
        return Err(ConfigError::Validation(format!(
            "readme repository must be in 'owner/name' form, got '{}'",
            config.repository
        )));
    }

    if config.branch.is_empty() {
        return Err(ConfigError::Validation(
            "readme branch cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates configured sources
fn validate_sources(sources: &[SourceEntry]) -> Result<(), ConfigError> {
    let mut names = HashSet::new();

    for entry in sources {
        let invalid = |reason: String| ConfigError::InvalidSource {
            name: entry.name.clone(),
            reason,
        };

        if entry.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source name cannot be empty".to_string(),
            ));
        }

        if !names.insert(entry.name.as_str()) {
            return Err(invalid("duplicate source name".to_string()));
        }

        let url = Url::parse(&entry.url)
            .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", entry.url, e)))?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }

        if let Extractor::Pointer { text, author } = &entry.extractor {
            if !text.starts_with('/') {
                return Err(invalid(format!(
                    "text pointer must start with '/', got '{}'",
                    text
                )));
            }
            if let Some(author) = author {
                if !author.starts_with('/') {
                    return Err(invalid(format!(
                        "author pointer must start with '/', got '{}'",
                        author
                    )));
                }
            }
        }
    }

    Ok(())
}
