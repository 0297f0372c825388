//! Source registry
//!
//! A static, ordered list of quote APIs. Each `Source` carries its endpoint,
//! query parameters, and the `Extractor` that turns a response into a quote.

mod extractor;
mod registry;

pub use extractor::{Extractor, UNKNOWN_AUTHOR};

use crate::config::{Config, SourceEntry};
use crate::store::Quote;
use crate::ConfigError;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

/// A query parameter value as written in the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Number(i64),
    /// Expands to one `key=value` pair per element
    List(Vec<String>),
}

impl ParamValue {
    fn values(&self) -> Vec<String> {
        match self {
            Self::Text(s) => vec![s.clone()],
            Self::Number(n) => vec![n.to_string()],
            Self::List(items) => items.clone(),
        }
    }
}

/// One quote API plus its request/response adapter
#[derive(Debug, Clone)]
pub struct Source {
    pub name: String,
    pub endpoint: Url,
    pub params: Vec<(String, String)>,
    pub extractor: Extractor,
}

impl Source {
    pub fn new(name: &str, endpoint: Url, extractor: Extractor) -> Self {
        Self {
            name: name.to_string(),
            endpoint,
            params: Vec::new(),
            extractor,
        }
    }

    /// Adds a query parameter
    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    /// Endpoint with all parameters appended as a query string
    pub fn request_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        if !self.params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(self.params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        url
    }

    pub fn extract(&self, data: &Value) -> Option<Quote> {
        self.extractor.extract(data)
    }
}

impl TryFrom<&SourceEntry> for Source {
    type Error = ConfigError;

    fn try_from(entry: &SourceEntry) -> Result<Self, Self::Error> {
        let endpoint = Url::parse(&entry.url)
            .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", entry.url, e)))?;

        let params = entry
            .params
            .iter()
            .flat_map(|(key, value)| value.values().into_iter().map(move |v| (key.clone(), v)))
            .collect();

        Ok(Self {
            name: entry.name.clone(),
            endpoint,
            params,
            extractor: entry.extractor.clone(),
        })
    }
}

/// Ordered, immutable list of sources
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: Vec<Source>,
}

impl SourceRegistry {
    pub fn new(sources: Vec<Source>) -> Self {
        Self { sources }
    }

    /// Sources declared in the config, or the built-in set when none are
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        if config.sources.is_empty() {
            return Ok(Self::builtin(config.harvest.length_cap()));
        }

        let sources = config
            .sources
            .iter()
            .map(Source::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(sources))
    }

    /// The built-in public endpoints
    pub fn builtin(max_length: Option<usize>) -> Self {
        Self::new(registry::builtin_sources(max_length))
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Source> {
        self.sources.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.name.as_str())
    }
}
