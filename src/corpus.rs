//! Corpus readers: turn files on disk into units of lemmas.
//!
//! Three layouts are understood. Pre-lemmatized token lists and CoNLL-U
//! treebanks already carry lemmas; raw text is cleaned of citation markup,
//! split into sentences and words, and run through a [`Lemmatizer`].

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use clap::ValueEnum;
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{CollocationError, Result};
use crate::lemmatize::{Lemmatizer, lemmatize_units};

const INPUT_EXTENSIONS: &[&str] = &["txt", "tess", "conllu", "tsv", "lem"];

/// Layout of the input files.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// One lemma per line (or `surface<TAB>lemma`), blank line ends a unit.
    Lemmas,
    /// CoNLL-U treebank, one unit per sentence.
    Conllu,
    /// Raw text with optional `<citation>` markup, lemmatized on the fly.
    Text,
}

static CITATION_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>\s*").expect("citation pattern compiles"));

/// Collect input files under `path`, or `path` itself if it is a file.
/// Results are sorted so runs over a directory are reproducible.
pub fn collect_files(path: &Path) -> Vec<String> {
    if path.is_file() {
        return vec![path.to_string_lossy().to_string()];
    }
    let mut files: Vec<String> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|x| x.to_str())
                .map(|x| INPUT_EXTENSIONS.contains(&x.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        })
        .map(|e| e.path().to_string_lossy().to_string())
        .collect();
    files.sort();
    files
}

/// Sentence selection for CoNLL-U input.
#[derive(Debug, Clone, Default)]
pub struct ConlluFilter {
    /// UPOS tags whose tokens are dropped.
    pub stop_pos: HashSet<String>,
    /// Keep a sentence only if one of its `#` metadata lines contains one of
    /// these substrings (case-insensitive). Empty keeps every sentence.
    pub meta_filter: Vec<String>,
}

impl ConlluFilter {
    fn keeps(&self, metadata: &[&str]) -> bool {
        if self.meta_filter.is_empty() {
            return true;
        }
        let meta = metadata.join(" ").to_lowercase();
        self.meta_filter
            .iter()
            .any(|needle| meta.contains(&needle.to_lowercase()))
    }
}

/// Read one file into lemma units.
pub fn read_lemma_units(
    path: &Path,
    format: InputFormat,
    lemmatizer: &dyn Lemmatizer,
    conllu: &ConlluFilter,
) -> Result<Vec<Vec<String>>> {
    let content = fs::read_to_string(path).map_err(|e| CollocationError::io(path, e))?;
    let units = match format {
        InputFormat::Lemmas => parse_lemma_lines(&content),
        InputFormat::Conllu => parse_conllu(&content, conllu),
        InputFormat::Text => lemmatize_units(lemmatizer, &split_text_units(&content)),
    };
    debug!(
        "{}: {} units, {} lemmas",
        path.display(),
        units.len(),
        units.iter().map(Vec::len).sum::<usize>()
    );
    Ok(units)
}

/// Pre-lemmatized token list. Lemmas are kept verbatim.
pub fn parse_lemma_lines(content: &str) -> Vec<Vec<String>> {
    let mut units = Vec::new();
    let mut current = Vec::new();
    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() {
            if !current.is_empty() {
                units.push(std::mem::take(&mut current));
            }
            continue;
        }
        if line.starts_with('#') {
            continue;
        }
        if let Some(lemma) = line.rsplit('\t').next().map(str::trim).filter(|l| !l.is_empty()) {
            current.push(lemma.to_string());
        }
    }
    if !current.is_empty() {
        units.push(current);
    }
    units
}

/// CoNLL-U: `ID FORM LEMMA UPOS ...`, sentences separated by blank lines.
///
/// Multiword ranges and empty nodes are skipped, as are tokens whose UPOS is
/// in `filter.stop_pos`. The `#` lines preceding a sentence are its metadata;
/// sentences whose metadata misses every `filter.meta_filter` entry are dropped.
pub fn parse_conllu(content: &str, filter: &ConlluFilter) -> Vec<Vec<String>> {
    let mut units = Vec::new();
    let mut current = Vec::new();
    let mut metadata: Vec<&str> = Vec::new();
    let mut dropped = 0usize;

    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() {
            end_sentence(filter, &mut current, &mut metadata, &mut units, &mut dropped);
            continue;
        }
        if let Some(meta) = line.strip_prefix('#') {
            metadata.push(meta.trim());
            continue;
        }
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() < 4 {
            warn!("Skipping malformed CoNLL-U line: {line:?}");
            continue;
        }
        let (id, lemma, upos) = (cols[0], cols[2], cols[3]);
        if id.contains('-') || id.contains('.') {
            continue;
        }
        if lemma.is_empty() || lemma == "_" || filter.stop_pos.contains(upos) {
            continue;
        }
        current.push(lemma.to_string());
    }
    end_sentence(filter, &mut current, &mut metadata, &mut units, &mut dropped);
    if dropped > 0 {
        debug!("Metadata filter dropped {dropped} sentences");
    }
    units
}

fn end_sentence(
    filter: &ConlluFilter,
    current: &mut Vec<String>,
    metadata: &mut Vec<&str>,
    units: &mut Vec<Vec<String>>,
    dropped: &mut usize,
) {
    if !current.is_empty() {
        if filter.keeps(metadata) {
            units.push(std::mem::take(current));
        } else {
            *dropped += 1;
            current.clear();
        }
    }
    metadata.clear();
}

/// Remove `<...>` citation tags (and the whitespace after them) from a line.
pub fn strip_markup(line: &str) -> String {
    CITATION_MARKUP.replace_all(line, "").trim().to_string()
}

fn is_sentence_end(c: char) -> bool {
    matches!(c, '.' | ';' | '!' | '?' | '\u{00B7}' | '\u{037E}' | '\u{0387}')
}

fn is_combining(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036F}' | '\u{1DC0}'..='\u{1DFF}')
}

fn is_elision(c: char) -> bool {
    matches!(c, '\'' | '\u{2019}' | '\u{02BC}')
}

/// Split raw text into sentences of surface words.
///
/// Words are runs of letters and combining marks; an apostrophe directly
/// after a letter is kept as part of an elided word.
pub fn split_text_units(content: &str) -> Vec<Vec<String>> {
    let mut units = Vec::new();
    let mut sentence: Vec<String> = Vec::new();
    let mut word = String::new();

    for line in content.lines() {
        let cleaned = strip_markup(line);
        for c in cleaned.chars() {
            if c.is_alphabetic() || is_combining(c) || (is_elision(c) && !word.is_empty()) {
                word.push(c);
                continue;
            }
            if !word.is_empty() {
                sentence.push(std::mem::take(&mut word));
            }
            if is_sentence_end(c) && !sentence.is_empty() {
                units.push(std::mem::take(&mut sentence));
            }
        }
        // a verse line ends a word, not a sentence
        if !word.is_empty() {
            sentence.push(std::mem::take(&mut word));
        }
    }
    if !sentence.is_empty() {
        units.push(sentence);
    }
    units
}
