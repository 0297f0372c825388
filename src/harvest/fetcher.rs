//! Single-fetch unit
//!
//! This module handles all HTTP requests made against quote sources:
//! - Building the HTTP client with a user agent and per-request timeout
//! - Fetching one source and classifying the outcome
//! - Falling through the registry until one source yields a quote
//!
//! A unit never retries the same source; retry pressure comes from the
//! coordinator dispatching more units.

use crate::config::{Config, UserAgentConfig};
use crate::harvest::stats::RunStats;
use crate::sources::{Source, SourceRegistry};
use crate::store::Quote;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Why a single source produced no quote
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response contained no quote text")]
    EmptyText,
}

/// Result of fetching one source
#[derive(Debug)]
pub enum SourceOutcome {
    /// A usable quote
    Accepted(Quote),

    /// A quote longer than the configured cap
    TooLong {
        /// Length of the rejected text in characters
        length: usize,
    },

    /// Network, status, JSON, or extraction failure
    Failed(FetchError),
}

/// A quote together with the source that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedQuote {
    pub quote: Quote,
    pub source: String,
}

/// What one single-fetch unit produced
#[derive(Debug, Default)]
pub struct FetchAttempt {
    /// The first accepted quote, if any source produced one
    pub quote: Option<FetchedQuote>,

    /// Counters for every source this unit touched
    pub stats: RunStats,
}

/// Anything the coordinator can dispatch single-fetch units against
#[async_trait]
pub trait QuoteFetcher: Send + Sync {
    /// Number of sources a unit may start from
    fn source_count(&self) -> usize;

    /// Source names in registry order
    fn source_names(&self) -> Vec<String>;

    /// Runs one unit starting at registry index `start`
    async fn fetch_one(&self, start: usize) -> FetchAttempt;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Per-request timeout
///
/// # Example
///
/// ```no_run
/// use bonjourr_quotes::config::UserAgentConfig;
/// use bonjourr_quotes::harvest::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one source and classifies the result
///
/// | Condition | Outcome |
/// |-----------|---------|
/// | Timeout | `Failed(Timeout)` |
/// | Connection / transport error | `Failed(Request)` |
/// | Non-2xx status | `Failed(Status)` |
/// | Body is not JSON | `Failed(Json)` |
/// | Extractor finds no text | `Failed(EmptyText)` |
/// | Text longer than `max_length` | `TooLong` |
/// | Otherwise | `Accepted` |
pub async fn fetch_from_source(
    client: &Client,
    source: &Source,
    max_length: Option<usize>,
) -> SourceOutcome {
    let url = source.request_url();

    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return SourceOutcome::Failed(classify(e)),
    };

    let status = response.status();
    if !status.is_success() {
        return SourceOutcome::Failed(FetchError::Status(status.as_u16()));
    }

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => return SourceOutcome::Failed(classify(e)),
    };

    let data: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(data) => data,
        Err(e) => return SourceOutcome::Failed(FetchError::Json(e)),
    };

    let Some(quote) = source.extract(&data) else {
        return SourceOutcome::Failed(FetchError::EmptyText);
    };

    match max_length {
        Some(max) if quote.char_len() > max => SourceOutcome::TooLong {
            length: quote.char_len(),
        },
        _ => SourceOutcome::Accepted(quote),
    }
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Request(e)
    }
}

/// Registry indices a unit visits when starting at `start`
///
/// With `wrap_around` every source is visited once, continuing from the
/// front after the end; otherwise the unit stops at the end of the registry.
pub fn attempt_order(start: usize, len: usize, wrap_around: bool) -> Vec<usize> {
    if len == 0 || start >= len {
        return Vec::new();
    }
    if wrap_around {
        (0..len).map(|i| (start + i) % len).collect()
    } else {
        (start..len).collect()
    }
}

/// Single-fetch units backed by real HTTP sources
pub struct HttpFetcher {
    client: Client,
    registry: SourceRegistry,
    max_length: Option<usize>,
    wrap_around: bool,
}

impl HttpFetcher {
    pub fn new(
        client: Client,
        registry: SourceRegistry,
        max_length: Option<usize>,
        wrap_around: bool,
    ) -> Self {
        Self {
            client,
            registry,
            max_length,
            wrap_around,
        }
    }

    /// Builds the client and registry described by `config`
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let client = build_http_client(&config.user_agent, config.harvest.request_timeout())?;
        let registry = SourceRegistry::from_config(config)?;
        Ok(Self::new(
            client,
            registry,
            config.harvest.length_cap(),
            config.harvest.wrap_around,
        ))
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }
}

#[async_trait]
impl QuoteFetcher for HttpFetcher {
    fn source_count(&self) -> usize {
        self.registry.len()
    }

    fn source_names(&self) -> Vec<String> {
        self.registry.names().map(str::to_string).collect()
    }

    async fn fetch_one(&self, start: usize) -> FetchAttempt {
        let mut attempt = FetchAttempt::default();

        for index in attempt_order(start, self.registry.len(), self.wrap_around) {
            let Some(source) = self.registry.get(index) else {
                continue;
            };

            match fetch_from_source(&self.client, source, self.max_length).await {
                SourceOutcome::Accepted(quote) => {
                    attempt.stats.record_success(&source.name);
                    attempt.quote = Some(FetchedQuote {
                        quote,
                        source: source.name.clone(),
                    });
                    break;
                }
                SourceOutcome::TooLong { length } => {
                    tracing::debug!("{}: quote too long ({} chars)", source.name, length);
                    attempt.stats.record_too_long(&source.name);
                }
                SourceOutcome::Failed(e) => {
                    tracing::debug!("{}: {}", source.name, e);
                    attempt.stats.record_failure(&source.name);
                }
            }
        }

        attempt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(10));
        assert!(client.is_ok());
    }

    #[test]
    fn test_attempt_order_wraps() {
        assert_eq!(attempt_order(2, 4, true), vec![2, 3, 0, 1]);
        assert_eq!(attempt_order(0, 3, true), vec![0, 1, 2]);
    }

    #[test]
    fn test_attempt_order_stops_at_end() {
        assert_eq!(attempt_order(2, 4, false), vec![2, 3]);
        assert_eq!(attempt_order(3, 4, false), vec![3]);
    }

    #[test]
    fn test_attempt_order_out_of_range() {
        assert!(attempt_order(0, 0, true).is_empty());
        assert!(attempt_order(5, 3, true).is_empty());
    }

    #[test]
    fn test_http_fetcher_from_default_config() {
        let fetcher = HttpFetcher::from_config(&Config::default()).unwrap();
        assert_eq!(fetcher.source_count(), fetcher.registry().len());
        assert_eq!(fetcher.source_names().len(), fetcher.source_count());
    }

    // Network behavior is covered with wiremock in tests/integration
}
