//! Per-run source statistics
//!
//! Every fetch attempt returns its own `RunStats`; the coordinator merges
//! them, so no counters are shared between tasks.

/// Outcome counters for one source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceTally {
    pub success: u32,
    pub failure: u32,
    pub too_long: u32,
}

impl SourceTally {
    pub fn total(&self) -> u32 {
        self.success + self.failure + self.too_long
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Source counters for one run, kept in registry order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    tallies: Vec<(String, SourceTally)>,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeds zeroed tallies so reports follow registry order
    pub fn with_sources<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut stats = Self::new();
        for name in names {
            stats.entry(name);
        }
        stats
    }

    fn entry(&mut self, name: &str) -> &mut SourceTally {
        let index = match self.tallies.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.tallies.push((name.to_string(), SourceTally::default()));
                self.tallies.len() - 1
            }
        };
        &mut self.tallies[index].1
    }

    pub fn record_success(&mut self, name: &str) {
        self.entry(name).success += 1;
    }

    pub fn record_failure(&mut self, name: &str) {
        self.entry(name).failure += 1;
    }

    pub fn record_too_long(&mut self, name: &str) {
        self.entry(name).too_long += 1;
    }

    /// Adds another run's counters into this one
    pub fn merge(&mut self, other: &RunStats) {
        for (name, tally) in &other.tallies {
            let entry = self.entry(name);
            entry.success += tally.success;
            entry.failure += tally.failure;
            entry.too_long += tally.too_long;
        }
    }

    pub fn get(&self, name: &str) -> Option<SourceTally> {
        self.tallies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, tally)| *tally)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SourceTally)> {
        self.tallies.iter().map(|(name, tally)| (name.as_str(), tally))
    }

    /// Sum over all sources
    pub fn totals(&self) -> SourceTally {
        self.tallies
            .iter()
            .fold(SourceTally::default(), |mut acc, (_, tally)| {
                acc.success += tally.success;
                acc.failure += tally.failure;
                acc.too_long += tally.too_long;
                acc
            })
    }
}
