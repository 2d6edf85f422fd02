//! Data model shared by the aggregation, scoring and ranking stages.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// A dictionary form, already normalized upstream.
///
/// Lemmas are opaque: equality is plain string equality and nothing in this
/// crate rewrites them. Cloning is cheap, so count tables can key on lemmas
/// freely.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lemma(Arc<str>);

impl Lemma {
    pub fn new(s: impl AsRef<str>) -> Self {
        Lemma(Arc::from(s.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Lemma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Lemma {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Lemma {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Lemma {
    fn from(s: &str) -> Self {
        Lemma::new(s)
    }
}

impl From<String> for Lemma {
    fn from(s: String) -> Self {
        Lemma(Arc::from(s))
    }
}

/// One position of the lemma sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LemmaToken {
    pub lemma: Lemma,
    /// First token of a document or sentence. Windows stop before such a token.
    pub is_unit_start: bool,
}

impl LemmaToken {
    pub fn new(lemma: impl Into<Lemma>, is_unit_start: bool) -> Self {
        Self {
            lemma: lemma.into(),
            is_unit_start,
        }
    }
}

/// Immutable input to the aggregator: lemmas in corpus order with unit boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LemmaSequence {
    tokens: Vec<LemmaToken>,
}

impl LemmaSequence {
    pub fn new(tokens: Vec<LemmaToken>) -> Self {
        Self { tokens }
    }

    /// Build a sequence from units of lemmas, flagging the first lemma of each
    /// unit. Empty units contribute nothing.
    pub fn from_units<U, S>(units: U) -> Self
    where
        U: IntoIterator,
        U::Item: IntoIterator<Item = S>,
        S: Into<Lemma>,
    {
        let mut tokens = Vec::new();
        for unit in units {
            let mut first = true;
            for lemma in unit {
                tokens.push(LemmaToken::new(lemma, first));
                first = false;
            }
        }
        Self { tokens }
    }

    pub fn tokens(&self) -> &[LemmaToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Split into contiguous unit slices. A leading run without a start flag
    /// still forms its own unit.
    pub fn units(&self) -> Vec<&[LemmaToken]> {
        let mut out = Vec::new();
        let mut start = 0;
        for (i, tok) in self.tokens.iter().enumerate() {
            if tok.is_unit_start && i > start {
                out.push(&self.tokens[start..i]);
                start = i;
            }
        }
        if start < self.tokens.len() {
            out.push(&self.tokens[start..]);
        }
        out
    }
}

/// Unordered pair of two distinct lemmas, stored in lexicographic order.
///
/// The only constructor canonicalizes, so `(a, b)` and `(b, a)` hash and
/// compare equal and a self-pair cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    first: Lemma,
    second: Lemma,
}

impl PairKey {
    /// Returns `None` when both lemmas are equal.
    pub fn new(x: &Lemma, y: &Lemma) -> Option<Self> {
        match x.cmp(y) {
            std::cmp::Ordering::Less => Some(Self {
                first: x.clone(),
                second: y.clone(),
            }),
            std::cmp::Ordering::Greater => Some(Self {
                first: y.clone(),
                second: x.clone(),
            }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn first(&self) -> &Lemma {
        &self.first
    }

    pub fn second(&self) -> &Lemma {
        &self.second
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}

/// A pair with its co-occurrence count and PMI.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPair {
    pub key: PairKey,
    pub count: u64,
    pub pmi: f64,
}

/// Output record handed to reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Collocation {
    pub lemma_a: String,
    pub lemma_b: String,
    pub pair_count: u64,
    pub pmi_score: f64,
}

impl From<&ScoredPair> for Collocation {
    fn from(p: &ScoredPair) -> Self {
        Self {
            lemma_a: p.key.first().to_string(),
            lemma_b: p.key.second().to_string(),
            pair_count: p.count,
            pmi_score: p.pmi,
        }
    }
}
