//! Adjacent three-lemma sequences, counted by frequency.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::{Lemma, LemmaSequence};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrigramCount {
    pub lemmas: [String; 3],
    pub count: u64,
}

/// Count `(l[i], l[i+1], l[i+2])` inside single units where all three lemmas
/// differ, and return the `top_n` most frequent (ties by trigram ascending).
pub fn top_trigrams(sequence: &LemmaSequence, top_n: usize) -> Vec<TrigramCount> {
    if top_n == 0 {
        return Vec::new();
    }
    let mut counts: HashMap<[&Lemma; 3], u64> = HashMap::new();
    for unit in sequence.units() {
        for w in unit.windows(3) {
            let (a, b, c) = (&w[0].lemma, &w[1].lemma, &w[2].lemma);
            if a != b && b != c && a != c {
                *counts.entry([a, b, c]).or_insert(0) += 1;
            }
        }
    }

    let mut ranked: Vec<([&Lemma; 3], u64)> = counts.into_iter().collect();
    ranked.sort_by(|x, y| y.1.cmp(&x.1).then_with(|| x.0.cmp(&y.0)));
    ranked
        .into_iter()
        .take(top_n)
        .map(|(t, count)| TrigramCount {
            lemmas: t.map(|l| l.to_string()),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_distinct_adjacent_triples() {
        let seq = LemmaSequence::from_units(vec![vec!["a", "b", "c", "a", "b", "c", "c", "d"]]);
        let top = top_trigrams(&seq, 10);
        assert_eq!(top[0].lemmas, ["a", "b", "c"].map(String::from));
        assert_eq!(top[0].count, 2);
        // (b,c,c) and (c,c,d) repeat a lemma
        assert!(top.iter().all(|t| t.lemmas[1] != "c" || t.lemmas[2] != "c"));
        assert_eq!(top.len(), 3);
    }

    #[test]
    fn never_spans_units() {
        let seq = LemmaSequence::from_units(vec![vec!["a", "b"], vec!["c", "d", "e"]]);
        let top = top_trigrams(&seq, 10);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].lemmas, ["c", "d", "e"].map(String::from));
    }

    #[test]
    fn zero_disables() {
        let seq = LemmaSequence::from_units(vec![vec!["a", "b", "c"]]);
        assert!(top_trigrams(&seq, 0).is_empty());
    }
}
