//! Bonjourr-Quotes: a rotating Chinese quote collection
//!
//! This crate polls public quote/aphorism APIs, accumulates new unique quotes
//! into a flat CSV file, and renders Markdown reports describing the result.

pub mod config;
pub mod harvest;
pub mod output;
pub mod sources;
pub mod store;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Bonjourr-Quotes operations
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("No new quotes were collected")]
    NoNewQuotes,

    #[error("Quote file not found: {}", path.display())]
    CsvMissing { path: PathBuf },

    #[error("Interrupted")]
    Interrupted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuoteError {
    /// Process exit code reported for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::CsvMissing { .. } => 2,
            Self::Store(store::StoreError::Encoding { .. }) => 3,
            Self::Interrupted => 130,
            _ => 1,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid source '{name}': {reason}")]
    InvalidSource { name: String, reason: String },
}

/// Result type alias for Bonjourr-Quotes operations
pub type Result<T> = std::result::Result<T, QuoteError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{HarvestOutcome, Harvester, HttpFetcher, QuoteFetcher, RunStats};
pub use sources::{Extractor, Source, SourceRegistry};
pub use store::{Quote, QuoteKey, QuoteStore, RunMode};
