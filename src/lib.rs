//! Assign binary phenotype indicators to individuals from ICD-9 and ICD-10
//! diagnosis codes.
//!
//! Phenotypes are defined in a table of ICD-9 ranges or lists and ICD-10 code
//! prefixes. Each subject-record extract is scored against those definitions,
//! and the scores of several extracts are merged per subject.

pub mod aggregate;
pub mod config;
pub mod definitions;
pub mod engine;
pub mod error;
pub mod extract;
pub mod io;
pub mod matching;
pub mod utils;

// Core types
pub use aggregate::{Aggregator, MergeRule, MergedOutput, MergedRow};
pub use config::{AssignConfig, ExtractJob, JobConfig};
pub use definitions::{CodeLookup, IcdRevision, PhenotypeDefinition};
pub use engine::IcdBioAssign;
pub use error::{AssignError, Result};
pub use extract::{ColumnSelection, Extract, ScanSpan};
pub use matching::{AssignmentVector, DatasetResult, Matcher, SubjectAssignment};

// Tabular I/O
pub use io::{Table, read_table, write_table};
