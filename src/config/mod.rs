//! Configuration for phenotype assignment runs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::aggregate::MergeRule;
use crate::definitions::IcdRevision;
use crate::error::{AssignError, Result};
use crate::extract::ColumnSelection;

/// Settings shared by every matching pass of an engine
#[derive(Debug, Clone)]
pub struct AssignConfig {
    /// Column holding the subject identifier in every extract
    pub id_column: usize,
    /// Cell value marking a missing diagnosis code
    pub missing_token: String,
    /// Log a progress line every this many rows (0 disables)
    pub progress_interval: usize,
    /// Draw a progress bar while matching
    pub show_progress: bool,
}

impl Default for AssignConfig {
    fn default() -> Self {
        Self {
            id_column: 0,
            missing_token: "nan".to_string(),
            progress_interval: 10_000,
            show_progress: true,
        }
    }
}

impl AssignConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_id_column(mut self, id_column: usize) -> Self {
        self.id_column = id_column;
        self
    }

    #[must_use]
    pub fn with_missing_token(mut self, token: impl Into<String>) -> Self {
        self.missing_token = token.into();
        self
    }

    #[must_use]
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    #[must_use]
    pub fn with_show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }
}

/// One extract of a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractJob {
    pub path: PathBuf,
    pub columns: ColumnSelection,
    pub revision: IcdRevision,
}

/// A complete run: definitions, extracts to match, merge rule and output file
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub definitions: PathBuf,
    pub output: PathBuf,
    pub merger: MergeRule,
    pub assign: AssignConfig,
    pub extracts: Vec<ExtractJob>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawJob {
    definitions: PathBuf,
    output: PathBuf,
    #[serde(default = "default_merger")]
    merger: String,
    #[serde(default)]
    id_column: usize,
    #[serde(default)]
    missing_token: Option<String>,
    #[serde(default)]
    progress_interval: Option<usize>,
    extracts: Vec<RawExtract>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawExtract {
    path: PathBuf,
    #[serde(default)]
    column_indexes: Value,
    #[serde(default = "default_icd_10")]
    icd_10: bool,
}

fn default_merger() -> String {
    MergeRule::default().to_string()
}

const fn default_icd_10() -> bool {
    true
}

impl JobConfig {
    /// Load a JSON job file
    ///
    /// Relative paths inside the file are resolved against the file's directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| AssignError::io(path, e))?;
        let mut job = Self::from_json_str(&text)?;
        if let Some(base) = path.parent() {
            job.resolve_relative_to(base);
        }
        Ok(job)
    }

    /// Parse and validate a JSON job description
    ///
    /// The merge rule and every column selection are checked before anything is read.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let raw: RawJob = serde_json::from_str(text)?;
        let merger: MergeRule = raw.merger.parse()?;

        if raw.extracts.is_empty() {
            return Err(AssignError::InvalidConfig(
                "a job needs at least one extract".to_string(),
            ));
        }

        let extracts = raw
            .extracts
            .into_iter()
            .map(|extract| -> Result<ExtractJob> {
                Ok(ExtractJob {
                    columns: ColumnSelection::try_from(&extract.column_indexes)?,
                    revision: IcdRevision::from_icd10_flag(extract.icd_10),
                    path: extract.path,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut assign = AssignConfig::default().with_id_column(raw.id_column);
        if let Some(token) = raw.missing_token {
            assign = assign.with_missing_token(token);
        }
        if let Some(interval) = raw.progress_interval {
            assign = assign.with_progress_interval(interval);
        }

        Ok(Self {
            definitions: raw.definitions,
            output: raw.output,
            merger,
            assign,
            extracts,
        })
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        resolve(&mut self.definitions);
        resolve(&mut self.output);
        for extract in &mut self.extracts {
            resolve(&mut extract.path);
        }
    }
}
