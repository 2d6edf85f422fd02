//! Lexical diversity of the lemma distribution.

use serde::Serialize;

use crate::aggregate::CountTables;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Diversity {
    /// Shannon entropy of the unigram distribution, in bits.
    pub entropy_bits: f64,
    /// Distinct lemmas divided by tokens.
    pub type_token_ratio: f64,
}

/// `H = -Σ p(x) log2 p(x)` over the unigram table. Zero for empty input.
pub fn shannon_entropy(tables: &CountTables) -> f64 {
    let n = tables.total_tokens();
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    let h: f64 = tables
        .unigrams()
        .values()
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.log2()
        })
        .sum();
    // a single type gives -0.0
    h.max(0.0)
}

pub fn type_token_ratio(tables: &CountTables) -> f64 {
    match tables.total_tokens() {
        0 => 0.0,
        n => tables.unigrams().len() as f64 / n as f64,
    }
}

pub fn diversity(tables: &CountTables) -> Diversity {
    Diversity {
        entropy_bits: shannon_entropy(tables),
        type_token_ratio: type_token_ratio(tables),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LemmaSequence;

    fn tables(words: &[&str]) -> CountTables {
        CountTables::build(&LemmaSequence::from_units(vec![words.to_vec()]), 2).unwrap()
    }

    #[test]
    fn uniform_distribution_has_log2_types_bits() {
        let d = diversity(&tables(&["a", "b", "c", "d"]));
        assert!((d.entropy_bits - 2.0).abs() < 1e-12);
        assert!((d.type_token_ratio - 1.0).abs() < 1e-12);
    }

    #[test]
    fn skewed_distribution() {
        // p = 3/4, 1/4
        let d = diversity(&tables(&["a", "a", "a", "b"]));
        let expected = -(0.75_f64 * 0.75_f64.log2() + 0.25 * 0.25_f64.log2());
        assert!((d.entropy_bits - expected).abs() < 1e-12);
        assert!((d.type_token_ratio - 0.5).abs() < 1e-12);
    }

    #[test]
    fn single_type_and_empty_are_zero() {
        assert_eq!(shannon_entropy(&tables(&["a", "a"])), 0.0);
        let empty = CountTables::default();
        assert_eq!(diversity(&empty), Diversity {
            entropy_bits: 0.0,
            type_token_ratio: 0.0
        });
    }
}
