use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading traces, reconstructing ranges or plotting.
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: cannot parse {token:?} as {expected}")]
    Parse {
        path: PathBuf,
        line: usize,
        token: String,
        expected: &'static str,
    },

    #[error("{path}:{line}: missing value")]
    MissingValue { path: PathBuf, line: usize },

    #[error("row count mismatch: {left} has {left_rows} rows, {right} has {right_rows}")]
    LengthMismatch {
        left: PathBuf,
        left_rows: usize,
        right: PathBuf,
        right_rows: usize,
    },

    #[error("{path}:{line}: {symbols} symbols but {deviations} deviations")]
    TermMismatch {
        path: PathBuf,
        line: usize,
        symbols: usize,
        deviations: usize,
    },

    #[error("invalid row window: {0}")]
    InvalidWindow(String),

    #[error("joint range has {terms} noise symbols, limit is {max_terms}")]
    TooManyTerms { terms: usize, max_terms: usize },

    #[error("no data: {0}")]
    Empty(String),

    #[error("invalid model parameter: {0}")]
    Model(String),

    #[error("plot error: {0}")]
    Plot(String),
}

impl TraceError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, TraceError>;
