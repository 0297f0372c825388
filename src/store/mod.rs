//! Quote store backed by a flat CSV file
//!
//! This module handles:
//! - The `Quote` record and its identity key
//! - Loading the CSV file (with or without a header row)
//! - Random pruning to bound file growth
//! - Merging new quotes and writing the whole file back

pub mod csv;

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use self::csv::{detect_header, parse_rows, write_row, Columns};

/// Errors that can occur while reading or writing the quote file
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8", path.display())]
    Encoding { path: PathBuf },
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A single quote
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

/// Identity of a quote: the exact (text, author) pair
///
/// No normalization beyond trimming, so quotes differing only in
/// punctuation are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuoteKey(String, String);

impl Quote {
    /// Creates a quote, trimming surrounding whitespace from both fields
    pub fn new(text: impl AsRef<str>, author: impl AsRef<str>) -> Self {
        Self {
            text: text.as_ref().trim().to_string(),
            author: author.as_ref().trim().to_string(),
        }
    }

    pub fn key(&self) -> QuoteKey {
        QuoteKey(self.text.clone(), self.author.clone())
    }

    /// Length of the text in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// How newly fetched quotes are merged into the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Randomly drop as many existing quotes as were fetched, then add
    #[default]
    Rotate,
    /// Only add
    Append,
}

/// What a merge did to the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub added: usize,
    pub removed: usize,
}

/// In-memory quote collection, loaded once and written back once per run
#[derive(Debug, Clone, Default)]
pub struct QuoteStore {
    quotes: Vec<Quote>,
}

impl QuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from quotes, keeping the first of any duplicates
    pub fn from_quotes(quotes: impl IntoIterator<Item = Quote>) -> Self {
        let mut store = Self::new();
        store.extend(quotes);
        store
    }

    /// Loads the store from a CSV file
    ///
    /// A missing file yields an empty store.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("{} does not exist yet, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let text = String::from_utf8(bytes).map_err(|_| StoreError::Encoding {
            path: path.to_path_buf(),
        })?;

        let store = Self::parse(&text);
        tracing::debug!("Loaded {} quotes from {}", store.len(), path.display());
        Ok(store)
    }

    /// Parses CSV text in either supported layout
    pub fn parse(text: &str) -> Self {
        let rows = parse_rows(text);
        let (columns, has_header) = detect_header(&rows);
        let skip = usize::from(has_header);

        let quotes = rows.iter().skip(skip).filter_map(|row| {
            let text = row.get(columns.text).map(|s| s.trim()).unwrap_or("");
            if text.is_empty() {
                return None;
            }
            let author = row.get(columns.author).map(|s| s.as_str()).unwrap_or("");
            Some(Quote::new(text, author))
        });

        Self::from_quotes(quotes)
    }

    /// Serializes the store as `text,author` with a header row
    pub fn to_csv_string(&self) -> String {
        let mut out = String::new();
        write_row(&mut out, &["text", "author"]);
        for quote in &self.quotes {
            let mut row = ["", ""];
            row[Columns::CANONICAL.text] = quote.text.as_str();
            row[Columns::CANONICAL.author] = quote.author.as_str();
            write_row(&mut out, &row);
        }
        out
    }

    /// Writes the whole store to `path` in a single write
    pub fn save(&self, path: &Path) -> StoreResult<()> {
        let io_err = |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        std::fs::write(path, self.to_csv_string()).map_err(io_err)?;
        tracing::info!("Wrote {} quotes to {}", self.len(), path.display());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Quote> {
        self.quotes.iter()
    }

    pub fn contains(&self, quote: &Quote) -> bool {
        self.quotes.iter().any(|q| q == quote)
    }

    /// Identity keys of every stored quote
    pub fn keys(&self) -> HashSet<QuoteKey> {
        self.quotes.iter().map(Quote::key).collect()
    }

    /// Adds quotes whose key is not already present; returns how many were added
    pub fn extend(&mut self, quotes: impl IntoIterator<Item = Quote>) -> usize {
        let mut seen = self.keys();
        let before = self.quotes.len();
        for quote in quotes {
            if seen.insert(quote.key()) {
                self.quotes.push(quote);
            }
        }
        self.quotes.len() - before
    }

    /// Removes up to `count` randomly chosen quotes; returns how many were removed
    pub fn prune<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> usize {
        let count = count.min(self.quotes.len());
        if count == 0 {
            return 0;
        }
        self.quotes.shuffle(rng);
        self.quotes.drain(..count);
        count
    }

    /// Merges new quotes according to `mode`
    pub fn merge<R: Rng + ?Sized>(
        &mut self,
        new_quotes: Vec<Quote>,
        mode: RunMode,
        rng: &mut R,
    ) -> MergeSummary {
        let removed = match mode {
            RunMode::Rotate => self.prune(new_quotes.len(), rng),
            RunMode::Append => 0,
        };
        if removed > 0 {
            tracing::warn!("Pruned {} existing quotes", removed);
        }
        let added = self.extend(new_quotes);
        MergeSummary { added, removed }
    }

    /// A random quote, if the store is not empty
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Quote> {
        self.quotes.choose(rng)
    }
}
