//! ICD-10 lookup construction
//!
//! ICD-10 codes are listed verbatim from the fourth column onward.

use super::{CodeLookup, cell};
use crate::io::Table;

/// First column holding ICD-10 codes
pub const FIRST_CODE_COLUMN: usize = 3;

/// Codes of one definitions row, empty cells dropped
#[must_use]
pub fn row_codes(row: &[String]) -> Vec<String> {
    row.iter()
        .skip(FIRST_CODE_COLUMN)
        .filter(|code| !code.is_empty())
        .cloned()
        .collect()
}

pub(super) fn construct_lookup(table: &Table) -> CodeLookup {
    table
        .rows
        .iter()
        .map(|row| (cell(row, 0), row_codes(row)))
        .collect()
}
