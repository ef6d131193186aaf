//! Error handling for phenotype assignment.
//!
//! Every failure is fatal for the batch: configuration and input errors are
//! returned to the caller, which aborts before any output file is written.

pub mod util;

use std::io;
use std::path::PathBuf;

/// Specialized error type for phenotype assignment
#[derive(Debug, thiserror::Error)]
pub enum AssignError {
    /// Column selection was neither absent, a header substring, nor a list of indexes
    #[error(
        "Unexpected argument for column indexes: found {found} but expected null, a string or a list of indexes\n\
         If you want to use all columns, leave column indexes as null\n\
         If you want to use columns whose header contains a string, for example 41202 for primary ICD 10 \
         diagnoses, pass that string as column indexes\n\
         If you want to use only specific columns, pass a list of the indexes of these columns"
    )]
    InvalidColumnSelection {
        /// Description of the value that was supplied
        found: String,
    },

    /// Merge rule name was not recognised
    #[error("Unexpected merger '{0}': expected one of Maximum, Constant")]
    InvalidMergeRule(String),

    /// Any other invalid run configuration
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// An ICD-9 minimum/maximum specification that cannot be normalised
    #[error(
        "Malformed ICD-9 specification for phenotype '{phenotype}' \
         (minimum: '{minimum}', maximum: '{maximum}'): {reason}"
    )]
    MalformedIcd9Spec {
        phenotype: String,
        minimum: String,
        maximum: String,
        reason: String,
    },

    /// A row is missing a column it must have
    #[error("{}: row {row} has no column {column}", path.display())]
    MissingColumn {
        path: PathBuf,
        row: usize,
        column: usize,
    },

    /// A table without a header row
    #[error("{}: table has no header row", .0.display())]
    EmptyTable(PathBuf),

    /// Error opening, reading or writing a file
    #[error("IO error for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Error parsing or writing CSV data
    #[error("CSV error for {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Error parsing a JSON job file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AssignError {
    /// Create an IO error tied to a path
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a CSV error tied to a path
    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    /// Whether this error comes from an invalid run configuration
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidColumnSelection { .. }
                | Self::InvalidMergeRule(_)
                | Self::InvalidConfig(_)
                | Self::Json(_)
        )
    }

    /// Whether this error comes from malformed input data
    #[must_use]
    pub const fn is_input(&self) -> bool {
        matches!(
            self,
            Self::MalformedIcd9Spec { .. } | Self::MissingColumn { .. } | Self::EmptyTable(_)
        )
    }
}

/// Result type for phenotype assignment operations
pub type Result<T> = std::result::Result<T, AssignError>;
