//! Extract loading
//!
//! An extract is one subject-record table to be scored. Loading resolves which
//! columns hold diagnosis codes and the span of fields scanned on every row.

use std::fmt;
use std::path::{Path, PathBuf};

use itertools::{Itertools, MinMaxResult};
use serde_json::Value;

use crate::error::{AssignError, Result};
use crate::io::{Table, read_table};

/// Which columns of an extract hold diagnosis codes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ColumnSelection {
    /// Every header column
    #[default]
    All,
    /// Every column whose header contains this substring (case-sensitive)
    HeaderContains(String),
    /// Exactly these column indexes
    Indexes(Vec<usize>),
}

impl ColumnSelection {
    /// Resolve the selection against a header row
    #[must_use]
    pub fn resolve(&self, headers: &[String]) -> Vec<usize> {
        match self {
            Self::All => (0..headers.len()).collect(),
            Self::HeaderContains(needle) => headers
                .iter()
                .enumerate()
                .filter(|(_, header)| header.contains(needle.as_str()))
                .map(|(index, _)| index)
                .collect(),
            Self::Indexes(indexes) => indexes.clone(),
        }
    }
}

impl fmt::Display for ColumnSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all columns"),
            Self::HeaderContains(needle) => write!(f, "columns containing '{needle}'"),
            Self::Indexes(indexes) => write!(f, "columns {indexes:?}"),
        }
    }
}

impl TryFrom<&Value> for ColumnSelection {
    type Error = AssignError;

    /// `null` selects all columns, a string selects by header substring and an
    /// array of non-negative integers selects explicit indexes.
    fn try_from(value: &Value) -> Result<Self> {
        let invalid = |found: String| AssignError::InvalidColumnSelection { found };
        match value {
            Value::Null => Ok(Self::All),
            Value::String(needle) => Ok(Self::HeaderContains(needle.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_u64()
                        .and_then(|index| usize::try_from(index).ok())
                        .ok_or_else(|| invalid(format!("a list containing {item}")))
                })
                .collect::<Result<Vec<_>>>()
                .map(Self::Indexes),
            Value::Bool(b) => Err(invalid(format!("a boolean ({b})"))),
            Value::Number(n) => Err(invalid(format!("a number ({n})"))),
            Value::Object(_) => Err(invalid("an object".to_string())),
        }
    }
}

impl From<&str> for ColumnSelection {
    fn from(needle: &str) -> Self {
        Self::HeaderContains(needle.to_string())
    }
}

impl From<Vec<usize>> for ColumnSelection {
    fn from(indexes: Vec<usize>) -> Self {
        Self::Indexes(indexes)
    }
}

/// Fields scanned on every row: `[min, max)` of the resolved indexes
///
/// The span covers every field between the smallest and largest selected index,
/// not only the selected ones, and is applied after the identifier field has been
/// removed from the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSpan {
    pub min: usize,
    pub max: usize,
}

impl ScanSpan {
    /// Span of a set of indexes, `None` when the set is empty
    #[must_use]
    pub fn from_indexes(indexes: &[usize]) -> Option<Self> {
        match indexes.iter().copied().minmax() {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(index) => Some(Self {
                min: index,
                max: index,
            }),
            MinMaxResult::MinMax(min, max) => Some(Self { min, max }),
        }
    }

    /// The part of `fields` inside the span, clamped to the row length
    #[must_use]
    pub fn slice<'a, T>(&self, fields: &'a [T]) -> &'a [T] {
        let end = self.max.min(fields.len());
        let start = self.min.min(end);
        &fields[start..end]
    }
}

/// A loaded extract ready for matching
#[derive(Debug, Clone)]
pub struct Extract {
    /// Where the table came from, if it was read from disk
    pub source: Option<PathBuf>,
    pub table: Table,
    /// Column indexes the selection resolved to
    pub indexes: Vec<usize>,
    pub span: ScanSpan,
    /// Column holding the subject identifier
    pub id_column: usize,
}

impl Extract {
    /// Read an extract file and resolve its code columns
    pub fn load(path: &Path, selection: &ColumnSelection, id_column: usize) -> Result<Self> {
        let table = read_table(path)?;
        let mut extract = Self::from_table(table, selection, id_column)?;
        extract.source = Some(path.to_path_buf());
        Ok(extract)
    }

    /// Resolve the code columns of an already loaded table
    pub fn from_table(table: Table, selection: &ColumnSelection, id_column: usize) -> Result<Self> {
        if id_column >= table.headers.len() {
            return Err(AssignError::InvalidConfig(format!(
                "identifier column {id_column} is out of range for a table with {} columns",
                table.headers.len()
            )));
        }

        let indexes = selection.resolve(&table.headers);
        let span = ScanSpan::from_indexes(&indexes).ok_or_else(|| {
            AssignError::InvalidConfig(format!("{selection} matched no columns of the extract"))
        })?;

        log::debug!(
            "Resolved {selection} to {} columns, scanning fields [{}, {})",
            indexes.len(),
            span.min,
            span.max
        );

        Ok(Self {
            source: None,
            table,
            indexes,
            span,
            id_column,
        })
    }

    /// Display name for logging
    #[must_use]
    pub fn name(&self) -> String {
        self.source
            .as_ref()
            .map_or_else(|| "<in-memory extract>".to_string(), |p| p.display().to_string())
    }
}
