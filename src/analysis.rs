//! End-to-end pipeline: read → lemmatize → aggregate → score → rank → export.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::aggregate::CountTables;
use crate::config::CollocationConfig;
use crate::corpus::{ConlluFilter, InputFormat, collect_files, read_lemma_units, split_text_units};
use crate::diversity::{Diversity, diversity};
use crate::error::{CollocationError, Result};
use crate::export::{ExportFormat, export_result, format_summary};
use crate::lemmatize::{
    Lemmatizer, LexiconLemmatizer, LowercaseLemmatizer, build_sequence, lemmatize_units,
    load_stopwords,
};
use crate::rank::{rank, rank_by_count};
use crate::score::score_pairs;
use crate::trigram::{TrigramCount, top_trigrams};
use crate::types::{Collocation, LemmaSequence};

/// Options for a whole run over files on disk.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub config: CollocationConfig,
    /// Window sizes to sweep. Empty means the single `config.window_size`.
    pub windows: Vec<usize>,
    pub input_format: InputFormat,
    pub export_format: ExportFormat,
    /// Merge all files into one result instead of one result per file.
    pub combine: bool,
    /// Number of trigrams to report; 0 turns trigram counting off.
    pub trigrams: usize,
    pub out_dir: PathBuf,
    /// UPOS tags dropped from CoNLL-U input.
    pub stop_pos: Vec<String>,
    /// Keep only CoNLL-U sentences whose metadata contains one of these.
    pub meta_filter: Vec<String>,
    /// `surface<TAB>lemma` table for the text format.
    pub lexicon: Option<PathBuf>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            config: CollocationConfig::default(),
            windows: Vec::new(),
            input_format: InputFormat::Lemmas,
            export_format: ExportFormat::Txt,
            combine: false,
            trigrams: 0,
            out_dir: PathBuf::from("."),
            stop_pos: Vec::new(),
            meta_filter: Vec::new(),
            lexicon: None,
        }
    }
}

/// Everything computed for one lemma sequence.
#[derive(Debug, Clone, Serialize)]
pub struct CollocationResult {
    pub config: CollocationConfig,
    pub total_tokens: u64,
    pub total_pairs: u64,
    pub distinct_lemmas: usize,
    pub distinct_pairs: usize,
    pub diversity: Diversity,
    /// Filtered ranking by PMI.
    pub by_pmi: Vec<Collocation>,
    /// Filtered ranking by raw pair count.
    pub by_count: Vec<Collocation>,
    pub trigrams: Vec<TrigramCount>,
}

#[derive(Debug, Default)]
pub struct AnalysisReport {
    /// Same text the CLI prints.
    pub summary: String,
    pub written: Vec<PathBuf>,
    /// `(file, reason)` for every input that could not be read.
    pub failed_files: Vec<(String, String)>,
}

/// Score and rank already aggregated tables.
pub fn rank_tables(
    tables: &CountTables,
    trigram_source: &LemmaSequence,
    config: &CollocationConfig,
    trigrams: usize,
) -> Result<CollocationResult> {
    config.validate()?;
    let scored = score_pairs(tables)?;
    let by_pmi = rank(&scored, config.min_count, config.top_k);
    let by_count = rank_by_count(&scored, config.min_count, config.top_k);
    Ok(CollocationResult {
        config: *config,
        total_tokens: tables.total_tokens(),
        total_pairs: tables.total_pairs(),
        distinct_lemmas: tables.unigrams().len(),
        distinct_pairs: tables.pairs().len(),
        diversity: diversity(tables),
        by_pmi: by_pmi.iter().map(Collocation::from).collect(),
        by_count: by_count.iter().map(Collocation::from).collect(),
        trigrams: top_trigrams(trigram_source, trigrams),
    })
}

/// Run the counting core over one lemma sequence.
pub fn analyze_sequence(
    sequence: &LemmaSequence,
    config: &CollocationConfig,
    trigrams: usize,
) -> Result<CollocationResult> {
    config.validate()?;
    let tables = CountTables::build(sequence, config.window_size)?;
    rank_tables(&tables, sequence, config, trigrams)
}

/// Lemmatize raw text with the given lemmatizer and analyze it.
/// Sentences become units; stopword lemmas are removed first.
pub fn analyze_text_with(
    text: &str,
    lemmatizer: &dyn Lemmatizer,
    stopwords: &HashSet<String>,
    config: &CollocationConfig,
    trigrams: usize,
) -> Result<CollocationResult> {
    config.validate()?;
    let lemmas = lemmatize_units(lemmatizer, &split_text_units(text));
    let sequence = build_sequence(lemmas, stopwords);
    analyze_sequence(&sequence, config, trigrams)
}

fn load_lemmatizer(opts: &AnalysisOptions) -> Result<Box<dyn Lemmatizer>> {
    Ok(match &opts.lexicon {
        Some(p) => Box::new(LexiconLemmatizer::from_tsv_file(p)?),
        None => Box::new(LowercaseLemmatizer),
    })
}

impl AnalysisOptions {
    /// The configs to run, one per swept window, each validated.
    pub fn sweep(&self) -> Result<Vec<CollocationConfig>> {
        let mut windows = if self.windows.is_empty() {
            vec![self.config.window_size]
        } else {
            self.windows.clone()
        };
        windows.sort_unstable();
        windows.dedup();
        windows
            .into_iter()
            .map(|window_size| {
                let config = CollocationConfig {
                    window_size,
                    ..self.config
                };
                config.validate()?;
                Ok(config)
            })
            .collect()
    }
}

/// One output stem per file, unique across the run.
///
/// The stem is the path below `root` without its extension, with separators
/// turned into `_`, so `one/s.lem` and `two/s.lem` become `one_s` and
/// `two_s`. Names that still collide get a `_2`, `_3`, ... suffix.
pub fn output_stems(root: &Path, files: &[String]) -> Vec<String> {
    let mut used: HashMap<String, usize> = HashMap::new();
    files
        .iter()
        .map(|file| {
            let path = Path::new(file);
            let rel = path.strip_prefix(root).unwrap_or(path).with_extension("");
            let joined = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .filter(|c| !c.is_empty() && c != "/")
                .collect::<Vec<_>>()
                .join("_");
            let base = if joined.is_empty() {
                path.file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_else(|| "input".to_string())
            } else {
                joined
            };
            let mut stem = base.clone();
            while let Some(n) = used.get_mut(&stem) {
                *n += 1;
                stem = format!("{base}_{n}");
            }
            used.insert(stem.clone(), 1);
            stem
        })
        .collect()
}

/// Analyze a file or directory and export the results.
///
/// Per-file mode scores each file on its own. Combined mode aggregates each
/// file separately on the rayon pool and merges the count tables before a
/// single scoring pass. Every window of a sweep reuses the same lemma
/// sequences. Unreadable files are skipped and listed in
/// [`AnalysisReport::failed_files`].
pub fn analyze_path(
    path: &Path,
    stopwords: Option<String>,
    opts: &AnalysisOptions,
) -> Result<AnalysisReport> {
    opts.config.validate()?;
    let configs = opts.sweep()?;
    if !path.exists() {
        return Err(CollocationError::PathNotFound(path.display().to_string()));
    }
    let files = collect_files(path);
    if files.is_empty() {
        return Err(CollocationError::NoFiles(path.display().to_string()));
    }
    let stems = output_stems(path, &files);

    let stop = match stopwords {
        Some(s) => load_stopwords(Path::new(&s))?,
        None => HashSet::new(),
    };
    let conllu = ConlluFilter {
        stop_pos: opts.stop_pos.iter().cloned().collect(),
        meta_filter: opts.meta_filter.clone(),
    };
    let lemmatizer = load_lemmatizer(opts)?;
    info!("Analyzing {} file(s) from {}", files.len(), path.display());

    let read: Vec<(String, Result<LemmaSequence>)> = files
        .par_iter()
        .map(|f| {
            let seq = read_lemma_units(Path::new(f), opts.input_format, lemmatizer.as_ref(), &conllu)
                .map(|units| build_sequence(units, &stop));
            (f.clone(), seq)
        })
        .collect();

    let mut report = AnalysisReport::default();
    let mut sequences = Vec::new();
    for ((file, seq), stem) in read.into_iter().zip(stems) {
        match seq {
            Ok(s) => sequences.push((stem, s)),
            Err(e) => {
                warn!("Skipping {file}: {e}");
                report.failed_files.push((file, e.to_string()));
            }
        }
    }

    let sweeping = configs.len() > 1;
    for config in &configs {
        let window = Window::new(config.window_size, sweeping);
        if opts.combine {
            let tables = sequences
                .par_iter()
                .map(|(_, s)| CountTables::build(s, config.window_size))
                .try_reduce(CountTables::default, |a, b| Ok(a.merge(b)))?;
            let joined = LemmaSequence::new(
                sequences
                    .iter()
                    .flat_map(|(_, s)| s.tokens().iter().cloned())
                    .collect(),
            );
            let result = rank_tables(&tables, &joined, config, opts.trigrams)?;
            emit("combined", &window, &result, opts, &mut report)?;
        } else {
            for (stem, seq) in &sequences {
                let result = analyze_sequence(seq, config, opts.trigrams)?;
                emit(stem, &window, &result, opts, &mut report)?;
            }
        }
    }
    Ok(report)
}

/// Labels for one window of a sweep; empty when only one window runs.
struct Window {
    heading: String,
    suffix: String,
}

impl Window {
    fn new(size: usize, sweeping: bool) -> Self {
        if sweeping {
            Window {
                heading: format!(" (window {size})"),
                suffix: format!("_w{size}"),
            }
        } else {
            Window {
                heading: String::new(),
                suffix: String::new(),
            }
        }
    }
}

fn emit(
    stem: &str,
    window: &Window,
    result: &CollocationResult,
    opts: &AnalysisOptions,
    report: &mut AnalysisReport,
) -> Result<()> {
    let heading = format!("{stem}{}", window.heading);
    report.summary.push_str(&format_summary(&heading, result));
    let written = export_result(stem, &window.suffix, result, opts.export_format, &opts.out_dir)?;
    report.written.extend(written);
    Ok(())
}

/// Print unreadable files to stderr.
pub fn print_failed_files(failed: &[(String, String)]) {
    eprintln!("Failed to read {} file(s):", failed.len());
    for (file, reason) in failed {
        eprintln!("  {file}: {reason}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(window_size: usize, min_count: u64, top_k: usize) -> CollocationConfig {
        CollocationConfig {
            window_size,
            min_count,
            top_k,
        }
    }

    #[test]
    fn worked_example_end_to_end() {
        let seq = LemmaSequence::from_units(vec![vec!["A", "B", "A", "B", "C"]]);
        let r = analyze_sequence(&seq, &cfg(5, 1, 50), 0).unwrap();
        let order: Vec<(&str, &str, u64)> = r
            .by_pmi
            .iter()
            .map(|c| (c.lemma_a.as_str(), c.lemma_b.as_str(), c.pair_count))
            .collect();
        assert_eq!(order, vec![("A", "B", 4), ("A", "C", 2), ("B", "C", 2)]);
        assert_eq!(r.total_tokens, 5);
        assert_eq!(r.total_pairs, 8);
    }

    #[test]
    fn invalid_config_stops_before_counting() {
        let seq = LemmaSequence::from_units(vec![vec!["a", "b"]]);
        assert!(matches!(
            analyze_sequence(&seq, &cfg(1, 1, 1), 0),
            Err(CollocationError::InvalidWindowSize(1))
        ));
        assert!(matches!(
            analyze_sequence(&seq, &cfg(5, 0, 1), 0),
            Err(CollocationError::InvalidMinCount(0))
        ));
        assert!(matches!(
            analyze_sequence(&seq, &cfg(5, 1, 0), 0),
            Err(CollocationError::InvalidTopK(0))
        ));
    }

    #[test]
    fn empty_sequence_is_not_an_error() {
        let r = analyze_sequence(&LemmaSequence::default(), &CollocationConfig::default(), 5).unwrap();
        assert!(r.by_pmi.is_empty());
        assert!(r.trigrams.is_empty());
        assert_eq!(r.total_tokens, 0);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let text = "arma virumque cano. Troiae qui primus ab oris Italiam fato profugus. \
                    arma virumque cano. Laviniaque venit litora. arma cano Troiae.";
        let a = analyze_text_with(text, &LowercaseLemmatizer, &HashSet::new(), &cfg(4, 1, 20), 5).unwrap();
        let b = analyze_text_with(text, &LowercaseLemmatizer, &HashSet::new(), &cfg(4, 1, 20), 5).unwrap();
        assert_eq!(a.by_pmi, b.by_pmi);
        assert_eq!(a.by_count, b.by_count);
        assert_eq!(a.trigrams, b.trigrams);
        assert!(a.by_pmi.iter().all(|c| c.lemma_a != c.lemma_b));
    }

    #[test]
    fn result_carries_lemma_diversity() {
        let seq = LemmaSequence::from_units(vec![vec!["a", "b"], vec!["c", "d"]]);
        let r = analyze_sequence(&seq, &cfg(2, 1, 10), 0).unwrap();
        assert!((r.diversity.entropy_bits - 2.0).abs() < 1e-12);
        assert!((r.diversity.type_token_ratio - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sweep_sorts_dedups_and_validates() {
        let mut opts = AnalysisOptions {
            config: cfg(5, 3, 7),
            ..AnalysisOptions::default()
        };
        let single = opts.sweep().unwrap();
        assert_eq!(single, vec![cfg(5, 3, 7)]);

        opts.windows = vec![5, 3, 4, 3];
        let sizes: Vec<usize> = opts.sweep().unwrap().iter().map(|c| c.window_size).collect();
        assert_eq!(sizes, vec![3, 4, 5]);
        assert!(opts.sweep().unwrap().iter().all(|c| c.min_count == 3 && c.top_k == 7));

        opts.windows = vec![3, 1];
        assert!(matches!(opts.sweep(), Err(CollocationError::InvalidWindowSize(1))));
    }

    #[test]
    fn output_stems_are_unique() {
        let root = Path::new("corpus");
        let files = vec![
            "corpus/a.lem".to_string(),
            "corpus/one/s.lem".to_string(),
            "corpus/one/s.txt".to_string(),
            "corpus/two/s.lem".to_string(),
        ];
        assert_eq!(output_stems(root, &files), vec!["a", "one_s", "one_s_2", "two_s"]);
    }

    #[test]
    fn single_file_root_keeps_its_stem() {
        let files = vec!["dir/iliad.lem".to_string()];
        assert_eq!(output_stems(Path::new("dir/iliad.lem"), &files), vec!["iliad"]);
    }
}
