use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use bonjourr_quotes::config::load_config;
///
/// let config = load_config(Path::new("quotes.toml")).unwrap();
/// println!("Workers: {}", config.harvest.max_workers);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is shown in the run report so a summary can be traced back to
/// the configuration that produced it.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Applies CI environment overrides on top of a loaded configuration
///
/// | Variable | Field |
/// |----------|-------|
/// | `GITHUB_REPOSITORY` | `readme.repository` |
/// | `DEFAULT_BRANCH` | `readme.branch` |
/// | `QUOTES_CSV` | `output.csv-path` |
/// | `GITHUB_STEP_SUMMARY` | `output.summary-path` |
///
/// `lookup` is usually `|key| std::env::var(key).ok()`; empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(repo) = get("GITHUB_REPOSITORY") {
        config.readme.repository = repo;
    }
    if let Some(branch) = get("DEFAULT_BRANCH") {
        config.readme.branch = branch;
    }
    if let Some(csv) = get("QUOTES_CSV") {
        config.output.csv_path = csv;
    }
    if let Some(summary) = get("GITHUB_STEP_SUMMARY") {
        config.output.summary_path = Some(summary);
    }
}
