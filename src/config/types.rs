use crate::sources::{Extractor, ParamValue};
use crate::store::RunMode;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Main configuration structure for Bonjourr-Quotes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub harvest: HarvestConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub readme: ReadmeConfig,
    #[serde(rename = "source", default)]
    pub sources: Vec<SourceEntry>,
}

/// Fetch loop behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HarvestConfig {
    /// Number of new unique quotes to collect per run
    pub target_count: usize,

    /// Maximum number of requests in flight at once
    pub max_workers: usize,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Maximum quote length in characters (0 disables the cap)
    pub max_length: usize,

    /// Consecutive zero-progress rounds before giving up
    pub max_consecutive_failures: u32,

    /// Extra attempts dispatched per round on top of what is still needed
    pub batch_margin: usize,

    /// Whether a fetch unit falls through past the end of the registry
    pub wrap_around: bool,

    /// How new quotes are merged into the store
    pub mode: RunMode,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            target_count: 15,
            max_workers: 5,
            request_timeout_secs: 10,
            max_length: 15,
            max_consecutive_failures: 100,
            batch_margin: 5,
            wrap_around: true,
            mode: RunMode::Rotate,
        }
    }
}

impl HarvestConfig {
    /// The length cap, if one is configured
    pub fn length_cap(&self) -> Option<usize> {
        (self.max_length > 0).then_some(self.max_length)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct UserAgentConfig {
    /// Name sent in the User-Agent header
    pub name: String,

    /// Version sent in the User-Agent header
    pub version: String,

    /// URL with information about the client
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: "bonjourr-quotes".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/rksk102/bonjourr-chinese-quotes".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Format: Name/Version (+ContactURL)
    pub fn header_value(&self) -> String {
        format!("{}/{} (+{})", self.name, self.version, self.contact_url)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OutputConfig {
    /// Path to the quotes CSV file
    pub csv_path: String,

    /// Path to the generated README
    pub readme_path: String,

    /// Path to the per-run Markdown summary (GitHub step summary)
    pub summary_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: "quotes.csv".to_string(),
            readme_path: "README.md".to_string(),
            summary_path: None,
        }
    }
}

/// README generation settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ReadmeConfig {
    /// GitHub repository in `owner/name` form
    pub repository: String,

    /// Branch the download links point at
    pub branch: String,

    /// Heading shown at the top of the README
    pub title: String,
}

impl Default for ReadmeConfig {
    fn default() -> Self {
        Self {
            repository: "rksk102/bonjourr-chinese-quotes".to_string(),
            branch: "main".to_string(),
            title: "bonjourr-chinese-quotes".to_string(),
        }
    }
}

/// A quote API declared in the configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct SourceEntry {
    /// Display name used in logs and reports
    pub name: String,

    /// Base endpoint URL
    pub url: String,

    /// Query parameters appended to the endpoint
    #[serde(default)]
    pub params: BTreeMap<String, ParamValue>,

    /// How to pull text and author out of the JSON response
    pub extractor: Extractor,
}
