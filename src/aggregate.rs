//! Sliding-window co-occurrence counting.
//!
//! Every position is counted once as a unigram. From each anchor `i` the scan
//! looks forward over `i+1 .. i+window_size-1`, stops at the first token that
//! opens a new unit, skips positions holding the anchor's own lemma, and adds
//! one to the canonical pair of the two lemmas. Scanning forward only means
//! each `(i, j)` event is counted exactly once.

use std::collections::HashMap;

use log::{debug, info};
use rayon::prelude::*;

use crate::config::validate_window_size;
use crate::error::Result;
use crate::types::{Lemma, LemmaSequence, LemmaToken, PairKey};

/// Unigram and pair counts of one run, plus their totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountTables {
    unigrams: HashMap<Lemma, u64>,
    pairs: HashMap<PairKey, u64>,
    total_tokens: u64,
    total_pairs: u64,
}

impl CountTables {
    /// Count a whole sequence in one pass.
    pub fn build(sequence: &LemmaSequence, window_size: usize) -> Result<Self> {
        validate_window_size(window_size)?;
        let tables = count_tokens(sequence.tokens(), window_size);
        info!(
            "Aggregated {} tokens: {} distinct lemmas, {} distinct pairs, {} pair events (window={})",
            tables.total_tokens,
            tables.unigrams.len(),
            tables.pairs.len(),
            tables.total_pairs,
            window_size
        );
        Ok(tables)
    }

    /// Key-wise sum of two tables.
    pub fn merge(mut self, other: CountTables) -> CountTables {
        for (lemma, n) in other.unigrams {
            *self.unigrams.entry(lemma).or_insert(0) += n;
        }
        for (key, n) in other.pairs {
            *self.pairs.entry(key).or_insert(0) += n;
        }
        self.total_tokens += other.total_tokens;
        self.total_pairs += other.total_pairs;
        self
    }

    pub fn unigrams(&self) -> &HashMap<Lemma, u64> {
        &self.unigrams
    }

    pub fn pairs(&self) -> &HashMap<PairKey, u64> {
        &self.pairs
    }

    pub fn unigram_count(&self, lemma: &str) -> u64 {
        self.unigrams.get(lemma).copied().unwrap_or(0)
    }

    /// Count for an unordered pair; argument order does not matter.
    pub fn pair_count(&self, x: &str, y: &str) -> u64 {
        PairKey::new(&Lemma::from(x), &Lemma::from(y))
            .and_then(|k| self.pairs.get(&k).copied())
            .unwrap_or(0)
    }

    /// N: number of tokens counted.
    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    /// N_pairs: number of `(i, j)` window events, i.e. the sum of all pair counts.
    pub fn total_pairs(&self) -> u64 {
        self.total_pairs
    }

    pub fn is_empty(&self) -> bool {
        self.total_tokens == 0
    }

    #[cfg(test)]
    pub(crate) fn from_raw(
        unigrams: HashMap<Lemma, u64>,
        pairs: HashMap<PairKey, u64>,
        total_tokens: u64,
        total_pairs: u64,
    ) -> Self {
        Self {
            unigrams,
            pairs,
            total_tokens,
            total_pairs,
        }
    }
}

fn count_tokens(tokens: &[LemmaToken], window_size: usize) -> CountTables {
    let mut tables = CountTables::default();
    for (i, anchor) in tokens.iter().enumerate() {
        *tables.unigrams.entry(anchor.lemma.clone()).or_insert(0) += 1;
        tables.total_tokens += 1;

        let end = i.saturating_add(window_size).min(tokens.len());
        for other in &tokens[i + 1..end] {
            if other.is_unit_start {
                break;
            }
            let Some(key) = PairKey::new(&anchor.lemma, &other.lemma) else {
                continue;
            };
            *tables.pairs.entry(key).or_insert(0) += 1;
            tables.total_pairs += 1;
        }
    }
    tables
}

/// Same counts as [`CountTables::build`], computed per unit on the rayon pool
/// and merged before anything is scored.
pub fn aggregate_sharded(sequence: &LemmaSequence, window_size: usize) -> Result<CountTables> {
    validate_window_size(window_size)?;
    let units = sequence.units();
    debug!("Aggregating {} units in parallel", units.len());
    let tables = units
        .par_iter()
        .map(|unit| count_tokens(unit, window_size))
        .reduce(CountTables::default, CountTables::merge);
    info!(
        "Aggregated {} tokens in {} shards: {} distinct pairs, {} pair events",
        tables.total_tokens,
        units.len(),
        tables.pairs.len(),
        tables.total_pairs
    );
    Ok(tables)
}
