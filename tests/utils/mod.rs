use std::fs;
use std::path::{Path, PathBuf};

use icd_bio_assign::{AssignConfig, Table, read_table};
use tempfile::TempDir;

/// Definitions with both ICD-9 and ICD-10 columns and ragged code lists
pub const DEFINITIONS_CSV: &str = "\
phenotype,icd9_min,icd9_max,icd10_1,icd10_2,icd10_3
myocardial_infarction,410,412,I21,I22,I252
asthma,493,,J45,J46,
diabetes,250 2500 2501,,E10,E11
no_codes,,,,,
";

/// A scratch directory holding the files of one test
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `name` inside the workspace
    pub fn file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).expect("write fixture");
        path
    }

    #[must_use]
    pub fn definitions(&self) -> PathBuf {
        self.file("definitions.csv", DEFINITIONS_CSV)
    }
}

/// Configuration without a progress bar
#[must_use]
pub fn quiet_config() -> AssignConfig {
    AssignConfig::default().with_show_progress(false)
}

/// Read an output table back
#[must_use]
pub fn read_output(path: &Path) -> Table {
    read_table(path).expect("read output table")
}

/// Convert string literals to owned strings
#[must_use]
pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}
