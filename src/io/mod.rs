//! Row-oriented tabular I/O
//!
//! Definitions, extracts and results are plain CSV files with one header row.
//! Every cell is kept as a string; rows may be ragged.

use std::path::Path;

use crate::error::util::{ensure_parent_dir, safe_open_file};
use crate::error::{AssignError, Result};

/// A loaded table: header row plus data rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Column names from the first row
    pub headers: Vec<String>,
    /// Data rows, each a list of raw cell values
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a table from already materialised headers and rows
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Number of data rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read a CSV file into a [`Table`]
///
/// A file without a header row is an [`AssignError::EmptyTable`].
pub fn read_table(path: &Path) -> Result<Table> {
    let file = safe_open_file(path, "reading table")?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AssignError::csv(path, e))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() {
        return Err(AssignError::EmptyTable(path.to_path_buf()));
    }

    let rows = reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect::<Vec<_>>())
                .map_err(|e| AssignError::csv(path, e))
        })
        .collect::<Result<Vec<_>>>()?;

    log::debug!(
        "Read {} rows x {} columns from {}",
        rows.len(),
        headers.len(),
        path.display()
    );

    Ok(Table { headers, rows })
}

/// Write a header and rows to a CSV file
///
/// Rows may be shorter than the header. The parent directory is created if needed.
pub fn write_table<H, R, C>(path: &Path, headers: &[H], rows: R) -> Result<()>
where
    H: AsRef<str>,
    R: IntoIterator<Item = Vec<C>>,
    C: AsRef<[u8]>,
{
    ensure_parent_dir(path)?;

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| AssignError::csv(path, e))?;

    writer
        .write_record(headers.iter().map(|h| AsRef::<str>::as_ref(h)))
        .map_err(|e| AssignError::csv(path, e))?;

    for row in rows {
        writer
            .write_record(&row)
            .map_err(|e| AssignError::csv(path, e))?;
    }

    writer.flush().map_err(|e| AssignError::io(path, e))
}
