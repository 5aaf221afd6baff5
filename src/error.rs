//! Error handling for Hidex TDCR processing operations.
//!
//! Every failure belongs to one of a small set of kinds: malformed instrument
//! values, broken cross-row invariants, calls made before their upstream table
//! exists, and invalid caller options. Nothing is retried; each error aborts
//! the derivation that raised it.

use std::path::PathBuf;
use thiserror::Error;

/// Broad category of a [`TdcrError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Format,
    Consistency,
    Precondition,
    Validation,
}

#[derive(Error, Debug)]
pub enum TdcrError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Input folder not found at path: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Invalid input file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Directory traversal error: {0}")]
    DirectoryTraversal(#[from] walkdir::Error),

    #[error("Plot error: {0}")]
    Plot(#[from] crate::plot::PlotError),

    #[error("Missing '{field}' in block {block} of file {file}")]
    MissingField {
        field: &'static str,
        block: usize,
        file: usize,
    },

    #[error("Invalid '{field}' value '{value}' in block {block} of file {file}")]
    InvalidField {
        field: &'static str,
        value: String,
        block: usize,
        file: usize,
    },

    #[error("Invalid end time '{value}' in block {block} of file {file}: {source}")]
    InvalidTimestamp {
        value: String,
        block: usize,
        file: usize,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Line {line} of {path} has no value for '{field}'")]
    MissingValue {
        path: String,
        line: usize,
        field: &'static str,
    },

    #[error("No readings found in the input files")]
    NoReadings,

    #[error("{message}. Check {table} table.")]
    Inconsistent { table: &'static str, message: String },

    #[error("No {missing} data to compute {target}. Please {remedy} first.")]
    MissingPrerequisite {
        missing: &'static str,
        target: &'static str,
        remedy: &'static str,
    },

    #[error("Invalid {option} '{value}'. Choose from {choices}.")]
    InvalidOption {
        option: &'static str,
        value: String,
        choices: &'static str,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl TdcrError {
    /// Which category of failure this error represents
    pub fn kind(&self) -> ErrorKind {
        match self {
            TdcrError::Io(_)
            | TdcrError::Polars(_)
            | TdcrError::InputNotFound { .. }
            | TdcrError::Pattern(_)
            | TdcrError::DirectoryTraversal(_)
            | TdcrError::Plot(_) => ErrorKind::Io,
            TdcrError::MissingField { .. }
            | TdcrError::InvalidField { .. }
            | TdcrError::InvalidTimestamp { .. }
            | TdcrError::MissingValue { .. }
            | TdcrError::NoReadings => ErrorKind::Format,
            TdcrError::Inconsistent { .. } => ErrorKind::Consistency,
            TdcrError::MissingPrerequisite { .. } => ErrorKind::Precondition,
            TdcrError::InvalidOption { .. } | TdcrError::Configuration { .. } => {
                ErrorKind::Validation
            }
        }
    }

    pub(crate) fn inconsistent(table: &'static str, message: impl Into<String>) -> Self {
        TdcrError::Inconsistent {
            table,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TdcrError>;
