#![forbid(unsafe_code)]
//! # Collocations CLI
//!
//! Command-line front end for the `collocations` crate: counts lemma pairs
//! in a sliding window, scores them by PMI and exports the ranking.
//!
//! ## Example
//! ```bash
//! cargo run --release -- corpus/ --input-format conllu --stop-pos PUNCT,DET --window 5 --min-count 3
//! ```
//!
//! See `--help` for all available options.

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use collocations::config::{DEFAULT_MIN_COUNT, DEFAULT_TOP_K, DEFAULT_WINDOW_SIZE};
use collocations::{
    AnalysisOptions, CollocationConfig, ExportFormat, InputFormat, analyze_path,
    print_failed_files,
};
use log::error;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// File or directory to analyze
    path: String,

    /// Window size including the anchor token (5 = four tokens of look-ahead).
    /// A comma-separated list (e.g. 3,4,5) runs one analysis per window.
    #[arg(long, value_delimiter = ',', default_values_t = [DEFAULT_WINDOW_SIZE])]
    window: Vec<usize>,

    /// Minimum co-occurrence count for a pair to be ranked
    #[arg(long, default_value_t = DEFAULT_MIN_COUNT)]
    min_count: u64,

    /// Number of collocations to report
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Input layout (lemmas, conllu, text)
    #[arg(long, value_enum, default_value = "lemmas")]
    input_format: InputFormat,

    /// Output format for export (txt, csv, tsv, json)
    #[arg(long, value_enum, default_value = "txt")]
    export_format: ExportFormat,

    /// Optional stopword lemma list (.txt, one lemma per line)
    #[arg(long)]
    stopwords: Option<String>,

    /// Optional surface<TAB>lemma table used with --input-format text
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Comma-separated UPOS tags to drop from CoNLL-U input
    #[arg(long, value_delimiter = ',')]
    stop_pos: Vec<String>,

    /// Comma-separated substrings; keep only CoNLL-U sentences whose `#`
    /// metadata contains one of them (case-insensitive)
    #[arg(long, value_delimiter = ',')]
    meta_filter: Vec<String>,

    /// Also report the N most frequent trigrams (0 = off)
    #[arg(long, default_value_t = 0)]
    trigrams: usize,

    /// If set, analyze all files together and output combined results
    #[arg(long, default_value_t = false)]
    combine: bool,

    /// Directory for exported files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let opts = AnalysisOptions {
        config: CollocationConfig {
            window_size: cli.window.first().copied().unwrap_or(DEFAULT_WINDOW_SIZE),
            min_count: cli.min_count,
            top_k: cli.top_k,
        },
        windows: cli.window,
        input_format: cli.input_format,
        export_format: cli.export_format,
        combine: cli.combine,
        trigrams: cli.trigrams,
        out_dir: cli.out_dir,
        stop_pos: cli.stop_pos,
        meta_filter: cli.meta_filter,
        lexicon: cli.lexicon,
    };

    match analyze_path(Path::new(&cli.path), cli.stopwords, &opts) {
        Ok(report) => {
            print!("{}", report.summary);
            if !report.failed_files.is_empty() {
                print_failed_files(&report.failed_files);
                process::exit(1);
            }
        }
        Err(e) => {
            error!("Error: {}", e);
            process::exit(1);
        }
    }
}
