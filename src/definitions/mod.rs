//! Phenotype definitions
//!
//! A definitions table has one row per phenotype:
//! `[name, icd9_minimum, icd9_maximum, icd10_code_1, icd10_code_2, ...]`.
//! The same table yields two lookups, one per ICD revision.

pub mod icd10;
pub mod icd9;

use std::fmt;
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::io::{Table, read_table};

/// ICD revision a lookup (or a matching pass) works with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IcdRevision {
    /// ICD-9: numeric ranges or lists normalised into codes
    Icd9,
    /// ICD-10: literal code prefixes
    Icd10,
}

impl IcdRevision {
    /// Pick the revision from an "is ICD-10" flag
    #[must_use]
    pub const fn from_icd10_flag(icd_10: bool) -> Self {
        if icd_10 { Self::Icd10 } else { Self::Icd9 }
    }
}

impl fmt::Display for IcdRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Icd9 => write!(f, "ICD-9"),
            Self::Icd10 => write!(f, "ICD-10"),
        }
    }
}

/// A named phenotype and the code tokens that identify it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhenotypeDefinition {
    pub name: String,
    pub codes: Vec<String>,
}

impl PhenotypeDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>, codes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            codes,
        }
    }
}

/// Phenotype name -> code tokens, iterated in insertion order
///
/// The key order fixes the column order of every assignment vector and of the
/// output header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeLookup {
    definitions: Vec<PhenotypeDefinition>,
    positions: FxHashMap<String, usize>,
}

impl CodeLookup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a phenotype
    ///
    /// A repeated name keeps its first position and takes the new codes.
    pub fn insert(&mut self, name: impl Into<String>, codes: Vec<String>) {
        let name = name.into();
        if let Some(&position) = self.positions.get(&name) {
            log::warn!("Phenotype '{name}' is defined more than once; using its last definition");
            self.definitions[position].codes = codes;
        } else {
            self.positions.insert(name.clone(), self.definitions.len());
            self.definitions.push(PhenotypeDefinition::new(name, codes));
        }
    }

    /// Load a definitions file and build the lookup for `revision`
    pub fn load(path: &Path, revision: IcdRevision) -> Result<Self> {
        let table = read_table(path)?;
        Self::from_table(&table, revision)
    }

    /// Build the lookup for `revision` from an already loaded definitions table
    pub fn from_table(table: &Table, revision: IcdRevision) -> Result<Self> {
        let lookup = match revision {
            IcdRevision::Icd9 => icd9::construct_lookup(table)?,
            IcdRevision::Icd10 => icd10::construct_lookup(table),
        };
        log::debug!("Built {revision} lookup with {} phenotypes", lookup.len());
        Ok(lookup)
    }

    /// Codes for a phenotype
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.positions
            .get(name)
            .map(|&position| self.definitions[position].codes.as_slice())
    }

    /// Phenotype names in key order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.iter().map(|d| d.name.as_str())
    }

    /// Definitions in key order
    pub fn iter(&self) -> std::slice::Iter<'_, PhenotypeDefinition> {
        self.definitions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl<'a> IntoIterator for &'a CodeLookup {
    type Item = &'a PhenotypeDefinition;
    type IntoIter = std::slice::Iter<'a, PhenotypeDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<N: Into<String>> FromIterator<(N, Vec<String>)> for CodeLookup {
    fn from_iter<I: IntoIterator<Item = (N, Vec<String>)>>(iter: I) -> Self {
        let mut lookup = Self::new();
        for (name, codes) in iter {
            lookup.insert(name, codes);
        }
        lookup
    }
}

/// Cell `index` of a row, or `""` past the end of a short row
pub(crate) fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map_or("", String::as_str)
}
