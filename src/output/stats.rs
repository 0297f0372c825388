//! Statistics over the quote store
//!
//! Backs the `--stats` command line mode.

use crate::sources::UNKNOWN_AUTHOR;
use crate::store::QuoteStore;
use std::collections::HashMap;

/// Store statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreStatistics {
    /// Number of quotes
    pub total: usize,

    /// Number of distinct authors
    pub unique_authors: usize,

    /// Quotes credited to the placeholder author
    pub unknown_authors: usize,

    /// Most quoted authors, most frequent first
    pub top_authors: Vec<(String, usize)>,

    /// Mean text length in characters
    pub average_length: f64,

    /// Longest text length in characters
    pub longest: usize,
}

impl StoreStatistics {
    /// Computes statistics for `store`, keeping `top` authors
    pub fn from_store(store: &QuoteStore, top: usize) -> Self {
        if store.is_empty() {
            return Self::default();
        }

        let mut by_author: HashMap<&str, usize> = HashMap::new();
        let mut total_length = 0usize;
        let mut longest = 0usize;

        for quote in store.iter() {
            *by_author.entry(quote.author.as_str()).or_default() += 1;
            let len = quote.char_len();
            total_length += len;
            longest = longest.max(len);
        }

        let unknown_authors = by_author.get(UNKNOWN_AUTHOR).copied().unwrap_or(0);

        let mut top_authors: Vec<(String, usize)> = by_author
            .iter()
            .filter(|(author, _)| **author != UNKNOWN_AUTHOR && !author.is_empty())
            .map(|(author, count)| (author.to_string(), *count))
            .collect();
        top_authors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_authors.truncate(top);

        Self {
            total: store.len(),
            unique_authors: by_author.len(),
            unknown_authors,
            top_authors,
            average_length: total_length as f64 / store.len() as f64,
            longest,
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Quote Statistics ===\n");

    println!("Overview:");
    println!("  Total quotes: {}", stats.total);
    println!("  Unique authors: {}", stats.unique_authors);
    println!("  Without author: {}", stats.unknown_authors);
    println!("  Average length: {:.1} chars", stats.average_length);
    println!("  Longest: {} chars", stats.longest);
    println!();

    if !stats.top_authors.is_empty() {
        println!("Top Authors:");
        for (author, count) in &stats.top_authors {
            let percentage = (*count as f64 / stats.total as f64) * 100.0;
            println!("  {}: {} ({:.1}%)", author, count, percentage);
        }
    }
}
