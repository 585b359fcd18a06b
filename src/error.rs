//! Error types for each pipeline stage.
//!
//! Every variant that stems from input text carries the fragment that failed,
//! so an operator can find the bad line without re-running with extra logging.

use std::path::PathBuf;
use thiserror::Error;

/// A query-digest report did not have the expected shape.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no `{field}` line found in input starting with {excerpt:?}")]
    MissingField { field: &'static str, excerpt: String },

    #[error("`{field}` value {fragment:?} is not a number")]
    InvalidNumber {
        field: &'static str,
        fragment: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("capture timestamp {fragment:?} does not match YYYY-MM-DD HH:MM:SS.ffffff")]
    InvalidTimestamp {
        fragment: String,
        #[source]
        source: time::error::Parse,
    },

    #[error("capture offset {fragment:?} is out of range")]
    InvalidOffset {
        fragment: String,
        #[source]
        source: time::error::ComponentRange,
    },
}

/// A line-oriented log contained a line that is not a valid tick.
#[derive(Debug, Error)]
#[error("line {line_no}: {kind} in {line:?}")]
pub struct ParseError {
    pub line_no: usize,
    pub line: String,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(line_no: usize, line: &str, kind: ParseErrorKind) -> Self {
        Self {
            line_no,
            line: line.to_string(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    #[error("expected at least {expected} fields, found {found}")]
    MissingFields { expected: usize, found: usize },
    #[error("{field} field {value:?} is not a number")]
    NotNumeric { field: &'static str, value: String },
    #[error("{field} value {value} is negative")]
    Negative { field: &'static str, value: f64 },
}

/// A file under a corpus root could not be read or parsed.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("failed to walk {root}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Aggregation was asked for over a series with no samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot aggregate an empty series")]
pub struct EmptyInputError;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("percentile rank {0} is outside [0, 100]")]
pub struct InvalidRankError(pub f64);
