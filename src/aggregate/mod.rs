//! Merging of independently matched extracts
//!
//! Each matching pass adds a [`DatasetResult`] to the aggregator. Compiling
//! merges, per subject, the assignment vectors of every dataset under a
//! [`MergeRule`]. A subject missing from any dataset is listed without values.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::error::{AssignError, Result};
use crate::io::write_table;
use crate::matching::{AssignmentVector, DatasetResult};

/// Header of the identifier column in every output table
pub const ID_HEADER: &str = "ID";

/// How per-dataset values for the same subject and phenotype are combined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MergeRule {
    /// 1 if any dataset has 1
    #[default]
    Maximum,
    /// 1 only if every dataset has 1
    Constant,
}

impl MergeRule {
    /// Merge aligned assignment vectors column by column
    ///
    /// Columns a shorter vector lacks count as 0.
    #[must_use]
    pub fn merge(self, vectors: &[&AssignmentVector]) -> AssignmentVector {
        let width = vectors.iter().map(|v| v.len()).max().unwrap_or(0);
        (0..width)
            .map(|column| {
                let mut values = vectors.iter().map(|v| v.get(column).copied().unwrap_or(0));
                match self {
                    Self::Maximum => values.max().unwrap_or(0),
                    Self::Constant => u8::from(values.all(|value| value == 1)),
                }
            })
            .collect()
    }
}

impl FromStr for MergeRule {
    type Err = AssignError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Maximum" => Ok(Self::Maximum),
            "Constant" => Ok(Self::Constant),
            other => Err(AssignError::InvalidMergeRule(other.to_string())),
        }
    }
}

impl fmt::Display for MergeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Maximum => write!(f, "Maximum"),
            Self::Constant => write!(f, "Constant"),
        }
    }
}

/// One output row: the identifier, and merged values when the subject was
/// present in every dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRow {
    pub id: String,
    pub values: Option<AssignmentVector>,
}

impl MergedRow {
    /// The identifier followed by any values
    #[must_use]
    pub fn to_record(&self) -> Vec<String> {
        std::iter::once(self.id.clone())
            .chain(self.values.iter().flatten().map(u8::to_string))
            .collect()
    }
}

/// The compiled result table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedOutput {
    /// `ID` followed by the phenotype names
    pub headers: Vec<String>,
    pub rows: Vec<MergedRow>,
}

impl MergedOutput {
    /// Subjects present in every dataset
    #[must_use]
    pub fn complete_count(&self) -> usize {
        self.rows.iter().filter(|row| row.values.is_some()).count()
    }

    /// Subjects missing from at least one dataset
    #[must_use]
    pub fn incomplete_count(&self) -> usize {
        self.rows.len() - self.complete_count()
    }

    /// Number of subjects assigned 1, per phenotype
    #[must_use]
    pub fn case_counts(&self) -> Vec<(&str, usize)> {
        self.headers
            .iter()
            .skip(1)
            .enumerate()
            .map(|(column, name)| {
                let cases = self
                    .rows
                    .iter()
                    .filter_map(|row| row.values.as_ref())
                    .filter(|values| values.get(column) == Some(&1))
                    .count();
                (name.as_str(), cases)
            })
            .collect()
    }

    /// Write the table to a CSV file
    pub fn write(&self, path: &Path) -> Result<()> {
        write_table(path, &self.headers, self.rows.iter().map(MergedRow::to_record))
    }
}

/// Buffer of matched datasets awaiting compilation
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    datasets: Vec<DatasetResult>,
}

impl Aggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, dataset: DatasetResult) {
        self.datasets.push(dataset);
    }

    #[must_use]
    pub fn datasets(&self) -> &[DatasetResult] {
        &self.datasets
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Merge the buffered datasets
    ///
    /// Identifiers are emitted in ascending order. A subject with several rows in
    /// one dataset is first reduced to one vector for that dataset with
    /// [`MergeRule::Maximum`].
    #[must_use]
    pub fn compile<N: AsRef<str>>(&self, rule: MergeRule, names: &[N]) -> MergedOutput {
        let per_dataset: Vec<FxHashMap<&str, AssignmentVector>> =
            self.datasets.iter().map(index_dataset).collect();

        let rows = per_dataset
            .iter()
            .flat_map(|index| index.keys().copied())
            .sorted_unstable()
            .dedup()
            .map(|id| {
                let present: Vec<&AssignmentVector> =
                    per_dataset.iter().filter_map(|index| index.get(id)).collect();
                let values = (present.len() == per_dataset.len()).then(|| rule.merge(&present));
                MergedRow {
                    id: id.to_string(),
                    values,
                }
            })
            .collect();

        let headers = std::iter::once(ID_HEADER.to_string())
            .chain(names.iter().map(|name| name.as_ref().to_string()))
            .collect();

        MergedOutput { headers, rows }
    }
}

fn index_dataset(dataset: &DatasetResult) -> FxHashMap<&str, AssignmentVector> {
    let mut index: FxHashMap<&str, AssignmentVector> = FxHashMap::default();
    for row in &dataset.rows {
        match index.get_mut(row.id.as_str()) {
            Some(existing) => {
                log::debug!("Subject {} appears more than once in one dataset", row.id);
                *existing = MergeRule::Maximum.merge(&[&*existing, &row.values]);
            }
            None => {
                index.insert(row.id.as_str(), row.values.clone());
            }
        }
    }
    index
}
