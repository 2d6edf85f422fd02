//! Pluggable lemmatization and construction of the lemma sequence.
//!
//! The counting core never talks to a lemmatizer directly. Readers hand
//! surface words to whatever [`Lemmatizer`] the caller injected and the
//! results are frozen into a [`LemmaSequence`].

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::error::{CollocationError, Result};
use crate::types::{LemmaSequence, LemmaToken};

/// Maps the surface words of one unit (sentence or document) to lemmas.
///
/// The output has exactly one entry per input word; `None` drops the word.
/// Implementations receive whole units so contextual taggers can be plugged in.
pub trait Lemmatizer: Send + Sync {
    fn lemmatize_unit(&self, words: &[String]) -> Vec<Option<String>>;
}

/// Lowercases every word. Used when no lexicon is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct LowercaseLemmatizer;

impl Lemmatizer for LowercaseLemmatizer {
    fn lemmatize_unit(&self, words: &[String]) -> Vec<Option<String>> {
        words.iter().map(|w| Some(w.to_lowercase())).collect()
    }
}

/// Dictionary lookup from surface form to lemma.
#[derive(Debug, Default, Clone)]
pub struct LexiconLemmatizer {
    table: HashMap<String, String>,
}

impl LexiconLemmatizer {
    pub fn new(table: HashMap<String, String>) -> Self {
        Self { table }
    }

    /// Load `surface<TAB>lemma` lines. Blank lines and `#` comments are skipped.
    pub fn from_tsv_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| CollocationError::io(path, e))?;
        let lex = Self::from_tsv_str(&content).map_err(|(line, message)| CollocationError::Lexicon {
            path: path.to_path_buf(),
            line,
            message,
        })?;
        info!("Loaded {} lexicon entries from {}", lex.len(), path.display());
        Ok(lex)
    }

    fn from_tsv_str(content: &str) -> std::result::Result<Self, (usize, String)> {
        let mut table = HashMap::new();
        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut cols = line.split('\t');
            match (cols.next(), cols.next()) {
                (Some(surface), Some(lemma)) if !surface.is_empty() && !lemma.trim().is_empty() => {
                    table.insert(surface.to_string(), lemma.trim().to_string());
                }
                _ => return Err((idx + 1, format!("expected `surface<TAB>lemma`, got {raw:?}"))),
            }
        }
        Ok(Self { table })
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Lemmatizer for LexiconLemmatizer {
    fn lemmatize_unit(&self, words: &[String]) -> Vec<Option<String>> {
        words
            .iter()
            .map(|w| {
                if let Some(l) = self.table.get(w) {
                    return Some(l.clone());
                }
                let lower = w.to_lowercase();
                match self.table.get(&lower) {
                    Some(l) => Some(l.clone()),
                    None => {
                        debug!("No lexicon entry for {w:?}, using {lower:?}");
                        Some(lower)
                    }
                }
            })
            .collect()
    }
}

/// Run the lemmatizer over every unit of surface words.
pub fn lemmatize_units<L>(lemmatizer: &L, units: &[Vec<String>]) -> Vec<Vec<String>>
where
    L: Lemmatizer + ?Sized,
{
    units
        .iter()
        .map(|unit| lemmatizer.lemmatize_unit(unit).into_iter().flatten().collect())
        .collect()
}

/// Freeze lemma units into the immutable sequence, dropping stopwords.
///
/// The first surviving lemma of each unit carries the unit-start flag, so a
/// removed stopword never lets a window reach into the neighbouring unit.
pub fn build_sequence(units: Vec<Vec<String>>, stopwords: &HashSet<String>) -> LemmaSequence {
    let mut tokens = Vec::new();
    let mut dropped = 0usize;
    for unit in units {
        let mut first = true;
        for lemma in unit {
            if lemma.is_empty() || stopwords.contains(&lemma) {
                dropped += 1;
                continue;
            }
            tokens.push(LemmaToken::new(lemma, first));
            first = false;
        }
    }
    if dropped > 0 {
        debug!("Dropped {dropped} stopword/empty lemmas");
    }
    LemmaSequence::new(tokens)
}

/// Read a stopword list: one lemma per line, blank lines ignored.
pub fn load_stopwords(path: &Path) -> Result<HashSet<String>> {
    let content = fs::read_to_string(path).map_err(|e| CollocationError::io(path, e))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::CountTables;

    fn words(ws: &[&str]) -> Vec<String> {
        ws.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn lowercase_keeps_diacritics() {
        let out = LowercaseLemmatizer.lemmatize_unit(&words(&["Ἀχιλῆος", "ΘΕΆ"]));
        assert_eq!(out, vec![Some("ἀχιλῆος".to_string()), Some("θεά".to_string())]);
    }

    #[test]
    fn lexicon_lookup_with_fallback() {
        let lex = LexiconLemmatizer::from_tsv_str("# comment\nἈχιλῆος\tἈχιλλεύς\nθεὰ\tθεά\n\n").unwrap();
        assert_eq!(lex.len(), 2);
        let out = lex.lemmatize_unit(&words(&["Ἀχιλῆος", "θεὰ", "Μῆνιν"]));
        assert_eq!(
            out,
            vec![Some("Ἀχιλλεύς".to_string()), Some("θεά".to_string()), Some("μῆνιν".to_string())]
        );
    }

    #[test]
    fn lexicon_from_in_memory_table() {
        let lex = LexiconLemmatizer::new(HashMap::from([
            ("virumque".to_string(), "vir".to_string()),
            ("Troiae".to_string(), "Troia".to_string()),
        ]));
        assert_eq!(lex.len(), 2);
        assert!(!lex.is_empty());
        let out = lex.lemmatize_unit(&words(&["Virumque", "Troiae", "cano"]));
        assert_eq!(
            out,
            vec![Some("vir".to_string()), Some("Troia".to_string()), Some("cano".to_string())]
        );
        assert!(LexiconLemmatizer::new(HashMap::new()).is_empty());
    }

    #[test]
    fn lexicon_reports_bad_line() {
        let err = LexiconLemmatizer::from_tsv_str("a\tb\nbroken\n").unwrap_err();
        assert_eq!(err.0, 2);
    }

    #[test]
    fn stopwords_do_not_open_a_window_across_units() {
        let units = vec![words(&["a", "b"]), words(&["καί", "c", "d"])];
        let stop: HashSet<String> = ["καί".to_string()].into_iter().collect();
        let seq = build_sequence(units, &stop);
        assert_eq!(seq.len(), 4);
        assert!(seq.tokens()[2].is_unit_start);
        let t = CountTables::build(&seq, 5).unwrap();
        assert_eq!(t.pair_count("b", "c"), 0);
        assert_eq!(t.pair_count("c", "d"), 1);
    }

    #[test]
    fn dropped_words_disappear() {
        struct DropShort;
        impl Lemmatizer for DropShort {
            fn lemmatize_unit(&self, words: &[String]) -> Vec<Option<String>> {
                words
                    .iter()
                    .map(|w| (w.chars().count() > 1).then(|| w.clone()))
                    .collect()
            }
        }
        let out = lemmatize_units(&DropShort, &[words(&["ab", "c", "de"])]);
        assert_eq!(out, vec![words(&["ab", "de"])]);
    }
}
