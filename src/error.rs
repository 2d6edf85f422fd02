use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong between reading a corpus and writing a ranking.
#[derive(Debug, Error)]
pub enum CollocationError {
    #[error("window size must be at least 2 (got {0})")]
    InvalidWindowSize(usize),

    #[error("minimum pair count must be at least 1 (got {0})")]
    InvalidMinCount(u64),

    #[error("top-k must be at least 1 (got {0})")]
    InvalidTopK(usize),

    /// A pair member has no unigram count. Only an aggregation bug can cause this.
    #[error("internal consistency error: lemma {lemma:?} occurs in a pair but has no unigram count")]
    Inconsistent { lemma: String },

    #[error("path does not exist: {0}")]
    PathNotFound(String),

    #[error("no readable input files under {0}")]
    NoFiles(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("lexicon {}:{line}: {message}", path.display())]
    Lexicon {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl CollocationError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CollocationError>;
