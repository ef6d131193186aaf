//! The assignment engine
//!
//! Lifecycle: build both lookups from a definitions file, run any number of
//! matching passes with [`IcdBioAssign::set_definitions`], then merge and write
//! everything once with [`IcdBioAssign::compile_and_write`].

use std::path::Path;
use std::time::Instant;

use crate::aggregate::{Aggregator, ID_HEADER, MergeRule, MergedOutput};
use crate::config::{AssignConfig, JobConfig};
use crate::definitions::{CodeLookup, IcdRevision};
use crate::error::{AssignError, Result};
use crate::extract::{ColumnSelection, Extract};
use crate::io::{read_table, write_table};
use crate::matching::{DatasetResult, Matcher, SubjectAssignment};
use crate::utils::logging::{log_operation_complete, log_operation_start, log_warning};

/// Assigns phenotypes to subjects across one or more extracts
#[derive(Debug, Clone)]
pub struct IcdBioAssign {
    icd9: CodeLookup,
    icd10: CodeLookup,
    config: AssignConfig,
    aggregator: Aggregator,
}

impl IcdBioAssign {
    /// Build the ICD-9 and ICD-10 lookups from one definitions file
    pub fn new(definitions_path: &Path, config: AssignConfig) -> Result<Self> {
        log_operation_start("Loading phenotype definitions from", definitions_path);
        let table = read_table(definitions_path)?;
        let icd9 = CodeLookup::from_table(&table, IcdRevision::Icd9)?;
        let icd10 = CodeLookup::from_table(&table, IcdRevision::Icd10)?;
        log::info!("Loaded {} phenotype definitions", icd9.len());
        Ok(Self::from_lookups(icd9, icd10, config))
    }

    /// Create an engine from lookups built elsewhere
    #[must_use]
    pub fn from_lookups(icd9: CodeLookup, icd10: CodeLookup, config: AssignConfig) -> Self {
        Self {
            icd9,
            icd10,
            config,
            aggregator: Aggregator::new(),
        }
    }

    /// Lookup used for `revision`
    #[must_use]
    pub fn lookup(&self, revision: IcdRevision) -> &CodeLookup {
        match revision {
            IcdRevision::Icd9 => &self.icd9,
            IcdRevision::Icd10 => &self.icd10,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AssignConfig {
        &self.config
    }

    /// Datasets matched so far
    #[must_use]
    pub fn datasets(&self) -> &[DatasetResult] {
        self.aggregator.datasets()
    }

    /// Load an extract, match it against the lookup for `revision` and buffer the result
    ///
    /// Returns the number of subject rows matched.
    pub fn set_definitions(
        &mut self,
        extract_path: &Path,
        column_indexes: &ColumnSelection,
        revision: IcdRevision,
    ) -> Result<usize> {
        log_operation_start("Loading extract", extract_path);
        let extract = Extract::load(extract_path, column_indexes, self.config.id_column)?;
        self.match_extract(&extract, revision)
    }

    /// Match an already loaded extract and buffer the result
    pub fn match_extract(&mut self, extract: &Extract, revision: IcdRevision) -> Result<usize> {
        let lookup = self.lookup(revision);
        if lookup.is_empty() {
            log_warning("No phenotype definitions to match", extract.source.as_deref());
        }

        let dataset = Matcher::new(lookup, &self.config.missing_token).match_extract(
            extract,
            revision,
            &self.config,
        )?;
        let rows = dataset.len();
        log::info!(
            "Matched {rows} subjects of {} against {} {revision} phenotypes",
            extract.name(),
            lookup.len()
        );
        self.aggregator.push(dataset);
        Ok(rows)
    }

    /// Write one buffered dataset on its own, without merging
    ///
    /// The header is `ID` followed by the phenotype names of the dataset's lookup.
    pub fn write_dataset(&self, index: usize, path: &Path) -> Result<()> {
        let dataset = self.datasets().get(index).ok_or_else(|| {
            AssignError::InvalidConfig(format!(
                "no dataset {index}; {} datasets have been matched",
                self.datasets().len()
            ))
        })?;

        let headers: Vec<&str> = std::iter::once(ID_HEADER)
            .chain(self.lookup(dataset.revision).names())
            .collect();
        write_table(path, &headers, dataset.rows.iter().map(SubjectAssignment::to_record))?;
        log_operation_complete("wrote", path, dataset.len(), None);
        Ok(())
    }

    /// Merge the buffered datasets under `rule`
    ///
    /// Output columns are named after the ICD-9 lookup, whichever lookup the data
    /// was matched against.
    #[must_use]
    pub fn compile(&self, rule: MergeRule) -> MergedOutput {
        let names: Vec<&str> = self.icd9.names().collect();
        self.aggregator.compile(rule, &names)
    }

    /// Merge every buffered dataset and write the result, consuming the engine
    ///
    /// `merger` must be `Maximum` or `Constant`; it is checked before any merging.
    pub fn compile_and_write(self, merger: &str, path: &Path) -> Result<MergedOutput> {
        let rule: MergeRule = merger.parse()?;
        let start = Instant::now();
        if self.aggregator.is_empty() {
            log_warning("No datasets were matched; writing a header-only table", Some(path));
        }

        let output = self.compile(rule);
        output.write(path)?;

        log_operation_complete("wrote", path, output.rows.len(), Some(start.elapsed()));
        log::info!(
            "{} subjects present in all {} datasets, {} missing from at least one",
            output.complete_count(),
            self.aggregator.len(),
            output.incomplete_count()
        );
        for (name, cases) in output.case_counts() {
            log::debug!("{name}: {cases} cases");
        }
        Ok(output)
    }

    /// Run a complete job: load definitions, match every extract, merge and write
    ///
    /// Nothing is written unless every extract matched successfully.
    pub fn run(job: &JobConfig) -> Result<MergedOutput> {
        let mut engine = Self::new(&job.definitions, job.assign.clone())?;
        for extract in &job.extracts {
            engine.set_definitions(&extract.path, &extract.columns, extract.revision)?;
        }
        engine.compile_and_write(&job.merger.to_string(), &job.output)
    }
}
