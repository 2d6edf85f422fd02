#![forbid(unsafe_code)]
//! # collocations
//!
//! Finds statistically significant word associations in a lemmatized corpus.
//! Lemma pairs are counted inside a forward sliding window that never crosses
//! a sentence or document boundary, scored by pointwise mutual information,
//! filtered by a minimum co-occurrence count and ranked.
//!
//! The library is usable at three levels:
//! - [`CountTables::build`], [`score_pairs`] and [`rank`] for the raw core,
//! - [`analyze_sequence`] / [`analyze_text_with`] for in-memory input,
//! - [`analyze_path`] for files on disk with export.
//!
//! ## Example
//! ```
//! use collocations::{CollocationConfig, LemmaSequence, analyze_sequence};
//!
//! let seq = LemmaSequence::from_units(vec![vec!["A", "B", "A", "B", "C"]]);
//! let config = CollocationConfig { window_size: 5, min_count: 1, top_k: 10 };
//! let result = analyze_sequence(&seq, &config, 0).unwrap();
//! assert_eq!(result.by_pmi[0].lemma_a, "A");
//! assert_eq!(result.by_pmi[0].lemma_b, "B");
//! assert_eq!(result.by_pmi[0].pair_count, 4);
//! ```

pub mod aggregate;
pub mod analysis;
pub mod config;
pub mod corpus;
pub mod diversity;
pub mod error;
pub mod export;
pub mod lemmatize;
pub mod rank;
pub mod score;
pub mod trigram;
pub mod types;

pub use aggregate::{CountTables, aggregate_sharded};
pub use analysis::{
    AnalysisOptions, AnalysisReport, CollocationResult, analyze_path, analyze_sequence,
    analyze_text_with, output_stems, print_failed_files, rank_tables,
};
pub use config::CollocationConfig;
pub use corpus::{ConlluFilter, InputFormat, collect_files, strip_markup};
pub use diversity::{Diversity, diversity};
pub use error::{CollocationError, Result};
pub use export::{ExportFormat, csv_safe_cell};
pub use lemmatize::{
    Lemmatizer, LexiconLemmatizer, LowercaseLemmatizer, build_sequence, lemmatize_units,
};
pub use rank::{rank, rank_by_count};
pub use score::{pmi, score_pairs};
pub use trigram::{TrigramCount, top_trigrams};
pub use types::{Collocation, Lemma, LemmaSequence, LemmaToken, PairKey, ScoredPair};
