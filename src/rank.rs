//! Frequency filter and ordering of scored pairs.

use std::cmp::Ordering;

use log::info;

use crate::types::ScoredPair;

/// PMI descending, then count descending, then canonical key ascending.
pub fn by_pmi(a: &ScoredPair, b: &ScoredPair) -> Ordering {
    b.pmi
        .total_cmp(&a.pmi)
        .then_with(|| b.count.cmp(&a.count))
        .then_with(|| a.key.cmp(&b.key))
}

/// Count descending, then PMI descending, then canonical key ascending.
pub fn by_count(a: &ScoredPair, b: &ScoredPair) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| b.pmi.total_cmp(&a.pmi))
        .then_with(|| a.key.cmp(&b.key))
}

/// Drop pairs seen fewer than `min_count` times and return the best `top_k`
/// by PMI. Fewer survivors than `top_k` is fine; the input is left untouched.
pub fn rank(scored: &[ScoredPair], min_count: u64, top_k: usize) -> Vec<ScoredPair> {
    rank_with(scored, min_count, top_k, by_pmi)
}

/// Same filter as [`rank`], ordered by raw co-occurrence count.
pub fn rank_by_count(scored: &[ScoredPair], min_count: u64, top_k: usize) -> Vec<ScoredPair> {
    rank_with(scored, min_count, top_k, by_count)
}

fn rank_with<F>(scored: &[ScoredPair], min_count: u64, top_k: usize, order: F) -> Vec<ScoredPair>
where
    F: Fn(&ScoredPair, &ScoredPair) -> Ordering,
{
    let mut kept: Vec<ScoredPair> = scored
        .iter()
        .filter(|p| p.count >= min_count)
        .cloned()
        .collect();
    let survivors = kept.len();
    kept.sort_by(|a, b| order(a, b));
    kept.truncate(top_k);
    info!(
        "Ranking: {} of {} pairs reach min_count={}, returning {}",
        survivors,
        scored.len(),
        min_count,
        kept.len()
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Lemma, PairKey};

    fn sp(a: &str, b: &str, count: u64, pmi: f64) -> ScoredPair {
        ScoredPair {
            key: PairKey::new(&Lemma::from(a), &Lemma::from(b)).unwrap(),
            count,
            pmi,
        }
    }

    fn names(v: &[ScoredPair]) -> Vec<String> {
        v.iter().map(|p| p.key.to_string()).collect()
    }

    #[test]
    fn hapax_is_filtered_even_with_best_pmi() {
        let pairs = vec![sp("a", "b", 1, 9.0), sp("c", "d", 3, 2.0), sp("e", "f", 2, 1.0)];
        let ranked = rank(&pairs, 2, 10);
        assert_eq!(names(&ranked), vec!["(c, d)", "(e, f)"]);
    }

    #[test]
    fn ties_break_on_count_then_key() {
        let pairs = vec![
            sp("y", "z", 2, 1.5),
            sp("b", "c", 2, 1.5),
            sp("a", "q", 5, 1.5),
            sp("m", "n", 9, 0.5),
        ];
        let ranked = rank(&pairs, 1, 10);
        assert_eq!(names(&ranked), vec!["(a, q)", "(b, c)", "(y, z)", "(m, n)"]);
    }

    #[test]
    fn top_k_truncates_and_short_input_is_not_an_error() {
        let pairs = vec![sp("a", "b", 2, 3.0), sp("c", "d", 2, 2.0), sp("e", "f", 2, 1.0)];
        assert_eq!(rank(&pairs, 1, 2).len(), 2);
        assert_eq!(rank(&pairs, 1, 50).len(), 3);
        assert!(rank(&[], 1, 5).is_empty());
    }

    #[test]
    fn input_is_not_reordered() {
        let pairs = vec![sp("a", "b", 2, 1.0), sp("c", "d", 2, 3.0)];
        let before = pairs.clone();
        let _ = rank(&pairs, 1, 5);
        assert_eq!(pairs, before);
    }

    #[test]
    fn count_ordering() {
        let pairs = vec![sp("a", "b", 2, 5.0), sp("c", "d", 7, 0.1), sp("e", "f", 7, 0.3)];
        let ranked = rank_by_count(&pairs, 1, 10);
        assert_eq!(names(&ranked), vec!["(e, f)", "(c, d)", "(a, b)"]);
    }
}
