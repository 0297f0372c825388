//! Harvest coordinator - the concurrent fetch loop
//!
//! This module repeatedly dispatches rounds of single-fetch units until the
//! target number of new unique quotes is reached or the failure streak
//! budget runs out:
//! - Each unit starts at an independently random registry index
//! - A semaphore bounds how many units are in flight at once
//! - Results are admitted one at a time on the coordinating task, so the
//!   seen-key check and insert never race
//! - Units are dispatched by the coordinating task as worker permits free
//!   up, so once the target is met the rest of the batch never starts;
//!   requests already in flight finish and only their counters are kept

use crate::config::HarvestConfig;
use crate::harvest::fetcher::{FetchAttempt, FetchedQuote, QuoteFetcher};
use crate::harvest::stats::RunStats;
use crate::store::{Quote, QuoteKey};
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Loop parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestSettings {
    /// New unique quotes to collect
    pub target: usize,

    /// Units allowed in flight at once
    pub max_workers: usize,

    /// Zero-progress rounds tolerated before stopping early
    pub max_consecutive_failures: u32,

    /// Extra units dispatched per round on top of what is still needed
    pub batch_margin: usize,
}

impl From<&HarvestConfig> for HarvestSettings {
    fn from(config: &HarvestConfig) -> Self {
        Self {
            target: config.target_count,
            max_workers: config.max_workers,
            max_consecutive_failures: config.max_consecutive_failures,
            batch_margin: config.batch_margin,
        }
    }
}

/// Result of one harvest run
#[derive(Debug, Clone)]
pub struct HarvestOutcome {
    /// Admitted quotes, in admission order
    pub quotes: Vec<FetchedQuote>,

    /// Merged counters of every unit that ran
    pub stats: RunStats,

    /// Rounds dispatched
    pub rounds: u32,

    /// Whether the loop stopped on the failure streak budget
    pub exhausted: bool,

    pub elapsed: Duration,
}

impl HarvestOutcome {
    /// The admitted quotes without source names
    pub fn new_quotes(&self) -> Vec<Quote> {
        self.quotes.iter().map(|f| f.quote.clone()).collect()
    }
}

/// Drives single-fetch units until the target is met
pub struct Harvester<F> {
    fetcher: Arc<F>,
    settings: HarvestSettings,
}

impl<F> Harvester<F>
where
    F: QuoteFetcher + 'static,
{
    pub fn new(fetcher: Arc<F>, settings: HarvestSettings) -> Self {
        Self { fetcher, settings }
    }

    pub fn settings(&self) -> &HarvestSettings {
        &self.settings
    }

    /// Units dispatched in a round when `remaining` quotes are still needed
    pub fn batch_size(&self, remaining: usize) -> usize {
        remaining
            .saturating_add(self.settings.batch_margin)
            .min(self.settings.max_workers.max(1).saturating_mul(2))
    }

    /// Runs the loop
    ///
    /// # Arguments
    ///
    /// * `seen` - Keys of quotes already stored; nothing matching them is admitted
    /// * `rng` - Source of start indices, injectable for reproducible runs
    pub async fn run<R>(&self, mut seen: HashSet<QuoteKey>, rng: &mut R) -> HarvestOutcome
    where
        R: Rng + ?Sized,
    {
        let started = Instant::now();
        let target = self.settings.target;
        let source_count = self.fetcher.source_count();
        let names = self.fetcher.source_names();

        let mut outcome = HarvestOutcome {
            quotes: Vec::with_capacity(target),
            stats: RunStats::with_sources(names.iter().map(String::as_str)),
            rounds: 0,
            exhausted: false,
            elapsed: Duration::ZERO,
        };

        if target == 0 {
            return finish(outcome, started, target);
        }

        if source_count == 0 {
            tracing::error!("No sources configured, nothing to fetch");
            outcome.exhausted = true;
            return finish(outcome, started, target);
        }

        tracing::info!(
            "Collecting {} quotes from {} sources with {} workers",
            target,
            source_count,
            self.settings.max_workers
        );

        let semaphore = Arc::new(Semaphore::new(self.settings.max_workers.max(1)));
        let mut streak = 0u32;

        while outcome.quotes.len() < target {
            outcome.rounds += 1;
            let mut pending = self.batch_size(target - outcome.quotes.len());
            let mut tasks: JoinSet<FetchAttempt> = JoinSet::new();
            let mut admitted = 0usize;

            // Units are dispatched from here only while the target is unmet,
            // so once it is reached the rest of the batch never starts.
            loop {
                let dispatching = pending > 0 && outcome.quotes.len() < target;

                let joined = if dispatching {
                    tokio::select! {
                        biased;
                        Some(joined) = tasks.join_next() => joined,
                        permit = Arc::clone(&semaphore).acquire_owned() => {
                            let Ok(permit) = permit else {
                                break;
                            };
                            pending -= 1;
                            let start = rng.random_range(0..source_count);
                            let fetcher = Arc::clone(&self.fetcher);
                            tasks.spawn(async move {
                                let attempt = fetcher.fetch_one(start).await;
                                drop(permit);
                                attempt
                            });
                            continue;
                        }
                    }
                } else {
                    match tasks.join_next().await {
                        Some(joined) => joined,
                        None => break,
                    }
                };

                let attempt = match joined {
                    Ok(attempt) => attempt,
                    Err(e) => {
                        tracing::warn!("Fetch task failed: {}", e);
                        continue;
                    }
                };

                outcome.stats.merge(&attempt.stats);

                let Some(fetched) = attempt.quote else {
                    continue;
                };
                if outcome.quotes.len() >= target {
                    tracing::trace!("Target met, discarding late quote from {}", fetched.source);
                    continue;
                }

                if seen.insert(fetched.quote.key()) {
                    tracing::debug!(
                        "Progress: {}/{} ({})",
                        outcome.quotes.len() + 1,
                        target,
                        fetched.source
                    );
                    outcome.quotes.push(fetched);
                    admitted += 1;
                } else {
                    tracing::trace!("Duplicate from {}: {}", fetched.source, fetched.quote.text);
                }
            }

            if pending > 0 && outcome.quotes.len() >= target {
                tracing::debug!("Target met, skipped {} queued units", pending);
            }

            if admitted == 0 {
                streak += 1;
                tracing::warn!(
                    "Round {} admitted nothing ({} in a row)",
                    outcome.rounds,
                    streak
                );
                if streak >= self.settings.max_consecutive_failures {
                    tracing::warn!(
                        "{} consecutive empty rounds, stopping with {}/{} quotes",
                        streak,
                        outcome.quotes.len(),
                        target
                    );
                    outcome.exhausted = true;
                    break;
                }
            } else {
                streak = 0;
                tracing::info!("Progress: {}/{}", outcome.quotes.len(), target);
            }
        }

        finish(outcome, started, target)
    }
}

/// Stamps the elapsed time and logs the run totals
fn finish(mut outcome: HarvestOutcome, started: Instant, target: usize) -> HarvestOutcome {
    outcome.elapsed = started.elapsed();
    tracing::info!(
        "Collected {}/{} quotes in {} rounds ({:.2}s)",
        outcome.quotes.len(),
        target,
        outcome.rounds,
        outcome.elapsed.as_secs_f64()
    );
    outcome
}
