//! Phenotype matching
//!
//! Every subject row is scored against every phenotype of a lookup: a phenotype
//! is assigned 1 when any of its code tokens occurs as a substring of any code
//! field on the row, 0 otherwise.

use std::path::PathBuf;
use std::time::Instant;

use crate::config::AssignConfig;
use crate::definitions::{CodeLookup, IcdRevision};
use crate::error::{AssignError, Result};
use crate::extract::{Extract, ScanSpan};
use crate::utils::logging::{
    create_row_progress_bar, finish_progress_bar, is_progress_row, log_operation_complete,
};

/// One 0/1 value per phenotype, in lookup key order
pub type AssignmentVector = Vec<u8>;

/// A subject identifier and its assignment vector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectAssignment {
    pub id: String,
    pub values: AssignmentVector,
}

impl SubjectAssignment {
    #[must_use]
    pub fn new(id: impl Into<String>, values: AssignmentVector) -> Self {
        Self {
            id: id.into(),
            values,
        }
    }

    /// The identifier followed by the values, as written to an output row
    #[must_use]
    pub fn to_record(&self) -> Vec<String> {
        std::iter::once(self.id.clone())
            .chain(self.values.iter().map(u8::to_string))
            .collect()
    }
}

/// Assignments produced by one matching pass over one extract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetResult {
    /// Revision of the lookup the extract was matched against
    pub revision: IcdRevision,
    /// Extract the rows came from, if it was read from disk
    pub source: Option<PathBuf>,
    pub rows: Vec<SubjectAssignment>,
}

impl DatasetResult {
    #[must_use]
    pub fn new(revision: IcdRevision, rows: Vec<SubjectAssignment>) -> Self {
        Self {
            revision,
            source: None,
            rows,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Whether `code` occurs inside any of the subject's code fields
#[must_use]
pub fn check_icd(fields: &[&str], code: &str) -> bool {
    fields.iter().any(|field| field.contains(code))
}

/// 1 if any code of the phenotype matches any field, else 0
///
/// A phenotype without codes never matches.
#[must_use]
pub fn assign_definition(fields: &[&str], codes: &[String]) -> u8 {
    u8::from(codes.iter().any(|code| check_icd(fields, code)))
}

/// Scores subject rows against one lookup
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    lookup: &'a CodeLookup,
    missing_token: &'a str,
}

impl<'a> Matcher<'a> {
    #[must_use]
    pub fn new(lookup: &'a CodeLookup, missing_token: &'a str) -> Self {
        Self {
            lookup,
            missing_token,
        }
    }

    /// Candidate code fields of a row
    ///
    /// The identifier field is removed first, then every field inside `span`
    /// that is not the missing-value token is kept.
    #[must_use]
    pub fn extract_codes<'r>(&self, row: &'r [String], id_column: usize, span: ScanSpan) -> Vec<&'r str> {
        let fields: Vec<&str> = row
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != id_column)
            .map(|(_, field)| field.as_str())
            .collect();

        span.slice(&fields)
            .iter()
            .copied()
            .filter(|field| *field != self.missing_token)
            .collect()
    }

    /// Assignment vector for a row's code fields
    #[must_use]
    pub fn assign(&self, fields: &[&str]) -> AssignmentVector {
        self.lookup
            .iter()
            .map(|definition| assign_definition(fields, &definition.codes))
            .collect()
    }

    /// Score every row of an extract
    pub fn match_extract(
        &self,
        extract: &Extract,
        revision: IcdRevision,
        config: &AssignConfig,
    ) -> Result<DatasetResult> {
        let start = Instant::now();
        let total = extract.table.len();
        let name = extract.name();
        let pb = create_row_progress_bar(total as u64, Some(name.as_str()), config.show_progress);

        let mut rows = Vec::with_capacity(total);
        for (index, row) in extract.table.rows.iter().enumerate() {
            if is_progress_row(index, config.progress_interval) {
                log::info!("{index} / {total}");
            }

            let id = row.get(extract.id_column).ok_or_else(|| AssignError::MissingColumn {
                path: extract.source.clone().unwrap_or_default(),
                row: index + 1,
                column: extract.id_column,
            })?;

            let fields = self.extract_codes(row, extract.id_column, extract.span);
            rows.push(SubjectAssignment::new(id.clone(), self.assign(&fields)));
            pb.inc(1);
        }
        finish_progress_bar(&pb, Some("matched"));

        if let Some(path) = &extract.source {
            log_operation_complete("matched", path, rows.len(), Some(start.elapsed()));
        }

        Ok(DatasetResult {
            revision,
            source: extract.source.clone(),
            rows,
        })
    }
}
