//! Configuration module for Bonjourr-Quotes
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults, so a missing file falls back to `Config::default()`.
//!
//! # Example
//!
//! ```no_run
//! use bonjourr_quotes::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("quotes.toml")).unwrap();
//! println!("Collecting {} quotes per run", config.harvest.target_count);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, HarvestConfig, OutputConfig, ReadmeConfig, SourceEntry, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, compute_config_hash, load_config, load_config_with_hash,
};
pub use validation::validate;
