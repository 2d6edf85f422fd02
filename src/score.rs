//! Pointwise mutual information over the aggregated counts.
//!
//! ```text
//! P(x)   = count(x) / N
//! P(x,y) = pair_count(x,y) / N_pairs
//! PMI    = log2( P(x,y) / (P(x) * P(y)) )
//!        = log2( pair_count * N * N / (N_pairs * count(x) * count(y)) )
//! ```
//!
//! The second form is what gets evaluated: both products are exact integers,
//! so pairs whose count ratios are equal get bit-identical scores and the
//! ranking's tie-breaks stay deterministic.

use log::info;

use crate::aggregate::CountTables;
use crate::error::{CollocationError, Result};
use crate::types::{PairKey, ScoredPair};

/// PMI from raw counts. All arguments must be positive.
pub fn pmi(pair_count: u64, count_x: u64, count_y: u64, total_tokens: u64, total_pairs: u64) -> f64 {
    let numerator = pair_count as u128 * total_tokens as u128 * total_tokens as u128;
    let denominator = total_pairs as u128 * count_x as u128 * count_y as u128;
    (numerator as f64 / denominator as f64).log2()
}

/// Score every pair in the table. The result is in canonical key order.
///
/// A pair member without a unigram count means the tables were not produced
/// by the aggregator; that is reported as [`CollocationError::Inconsistent`]
/// instead of producing a NaN or infinite score.
pub fn score_pairs(tables: &CountTables) -> Result<Vec<ScoredPair>> {
    let n = tables.total_tokens();
    let n_pairs = tables.total_pairs();

    let mut scored = Vec::with_capacity(tables.pairs().len());
    for (key, &count) in tables.pairs() {
        let cx = marginal(tables, key, true)?;
        let cy = marginal(tables, key, false)?;
        scored.push(ScoredPair {
            key: key.clone(),
            count,
            pmi: pmi(count, cx, cy, n, n_pairs),
        });
    }
    scored.sort_by(|a, b| a.key.cmp(&b.key));
    info!("Scored {} pairs (N={}, N_pairs={})", scored.len(), n, n_pairs);
    Ok(scored)
}

fn marginal(tables: &CountTables, key: &PairKey, first: bool) -> Result<u64> {
    let lemma = if first { key.first() } else { key.second() };
    match tables.unigram_count(lemma.as_str()) {
        0 => Err(CollocationError::Inconsistent {
            lemma: lemma.to_string(),
        }),
        c => Ok(c),
    }
}
