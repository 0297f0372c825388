//! Harvest module for collecting new quotes
//!
//! This module contains the core fetch logic, including:
//! - Single-fetch units that fall through the source registry
//! - The concurrent loop that dispatches units in rounds
//! - Per-run source statistics

mod coordinator;
mod fetcher;
pub mod stats;

pub use coordinator::{HarvestOutcome, HarvestSettings, Harvester};
pub use fetcher::{
    attempt_order, build_http_client, fetch_from_source, FetchAttempt, FetchError, FetchedQuote,
    HttpFetcher, QuoteFetcher, SourceOutcome,
};
pub use stats::{RunStats, SourceTally};

use crate::config::Config;
use crate::store::QuoteKey;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;

/// Runs a complete harvest against the configured HTTP sources
///
/// # Arguments
///
/// * `config` - The loaded configuration
/// * `seen` - Keys of quotes already in the store
/// * `rng` - Random source for start indices
///
/// # Returns
///
/// * `Ok(HarvestOutcome)` - The loop ran (possibly stopping early)
/// * `Err(QuoteError)` - The client or registry could not be built
pub async fn harvest<R>(
    config: &Config,
    seen: HashSet<QuoteKey>,
    rng: &mut R,
) -> crate::Result<HarvestOutcome>
where
    R: Rng + ?Sized,
{
    let fetcher = Arc::new(HttpFetcher::from_config(config)?);
    let harvester = Harvester::new(fetcher, HarvestSettings::from(&config.harvest));
    Ok(harvester.run(seen, rng).await)
}
