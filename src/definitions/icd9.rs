//! ICD-9 lookup construction
//!
//! ICD-9 definitions are written as a minimum and a maximum specification,
//! each a space separated list of tokens:
//!
//! | minimum   | maximum | codes                       |
//! |-----------|---------|-----------------------------|
//! | `1`       | `5`     | inclusive range `1..=5`     |
//! | `7`       | empty   | `7`                         |
//! | `1 2 3`   | empty   | `1`, `2`, `3`               |
//! | `1 2`     | `5`     | malformed, fatal            |

use super::{CodeLookup, cell};
use crate::error::{AssignError, Result};
use crate::io::Table;

/// Column holding the minimum specification
pub const MINIMUM_COLUMN: usize = 1;
/// Column holding the maximum specification
pub const MAXIMUM_COLUMN: usize = 2;

/// Normalise an ICD-9 minimum/maximum specification into discrete codes
///
/// A row with neither specification yields no codes, so the phenotype never
/// matches on ICD-9 data.
pub fn normalize_spec(phenotype: &str, minimum: &str, maximum: &str) -> Result<Vec<String>> {
    let min_tokens: Vec<&str> = minimum.split_whitespace().collect();
    let max_tokens: Vec<&str> = maximum.split_whitespace().collect();

    let malformed = |reason: String| AssignError::MalformedIcd9Spec {
        phenotype: phenotype.to_string(),
        minimum: minimum.to_string(),
        maximum: maximum.to_string(),
        reason,
    };

    match (min_tokens.as_slice(), max_tokens.as_slice()) {
        ([], []) => Ok(Vec::new()),
        ([low], [high]) => {
            let low: i64 = low
                .parse()
                .map_err(|_| malformed(format!("range start '{low}' is not an integer")))?;
            let high: i64 = high
                .parse()
                .map_err(|_| malformed(format!("range end '{high}' is not an integer")))?;
            if low > high {
                return Err(malformed(format!("range {low}..{high} is descending")));
            }
            Ok((low..=high).map(|code| code.to_string()).collect())
        }
        ([single], []) => Ok(vec![(*single).to_string()]),
        (list, []) => Ok(list.iter().map(|code| (*code).to_string()).collect()),
        ([], _) => Err(malformed("maximum given without a minimum".to_string())),
        (list, bounds) => Err(malformed(format!(
            "{} minimum tokens cannot be combined with {} maximum tokens",
            list.len(),
            bounds.len()
        ))),
    }
}

pub(super) fn construct_lookup(table: &Table) -> Result<CodeLookup> {
    let mut lookup = CodeLookup::new();
    for row in &table.rows {
        let name = cell(row, 0);
        let codes = normalize_spec(name, cell(row, MINIMUM_COLUMN), cell(row, MAXIMUM_COLUMN))?;
        if codes.is_empty() {
            log::warn!("Phenotype '{name}' has no ICD-9 specification and will never match ICD-9 data");
        }
        lookup.insert(name, codes);
    }
    Ok(lookup)
}
