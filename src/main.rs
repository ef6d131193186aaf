use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand};
use icd_bio_assign::{
    AssignConfig, CodeLookup, ColumnSelection, IcdBioAssign, IcdRevision, JobConfig, MergeRule,
};
use log::{error, info};

#[derive(Parser)]
#[command(name = "icd-assign")]
#[command(about = "Assign phenotypes to individuals from ICD-9/ICD-10 diagnosis codes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a JSON job file
    Run {
        /// Path to the job file
        job: PathBuf,
    },
    /// Match one or more extracts sharing the same column selection
    #[command(group(ArgGroup::new("selection").args(["columns", "indexes"])))]
    Assign {
        /// Phenotype definitions table
        #[arg(long)]
        definitions: PathBuf,
        /// Extract table (repeat for several extracts)
        #[arg(long = "extract", required = true)]
        extracts: Vec<PathBuf>,
        /// Use columns whose header contains this text
        #[arg(long)]
        columns: Option<String>,
        /// Use these column indexes (comma-separated)
        #[arg(long, value_delimiter = ',')]
        indexes: Option<Vec<usize>>,
        /// Match against the ICD-9 definitions instead of ICD-10
        #[arg(long)]
        icd9: bool,
        /// Column holding the subject identifier
        #[arg(long, default_value_t = 0)]
        id_column: usize,
        /// Merge rule: Maximum or Constant
        #[arg(long, default_value = "Maximum")]
        merger: String,
        /// Output table
        #[arg(long)]
        output: PathBuf,
        /// Hide the progress bar
        #[arg(long)]
        quiet: bool,
    },
    /// Print the phenotypes of a definitions table
    Inspect {
        /// Phenotype definitions table
        #[arg(long)]
        definitions: PathBuf,
        /// Show the ICD-9 lookup instead of ICD-10
        #[arg(long)]
        icd9: bool,
    },
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run { job } => {
            let config = JobConfig::from_path(&job)
                .with_context(|| format!("Failed to load job file {}", job.display()))?;
            let output = IcdBioAssign::run(&config).context("Phenotype assignment failed")?;
            info!(
                "Wrote {} subjects to {}",
                output.rows.len(),
                config.output.display()
            );
        }
        Commands::Assign {
            definitions,
            extracts,
            columns,
            indexes,
            icd9,
            id_column,
            merger,
            output,
            quiet,
        } => {
            // Validate the merge rule before reading any data
            merger.parse::<MergeRule>()?;

            let selection = match (columns, indexes) {
                (Some(needle), _) => ColumnSelection::HeaderContains(needle),
                (None, Some(indexes)) => ColumnSelection::Indexes(indexes),
                (None, None) => ColumnSelection::All,
            };
            let config = AssignConfig::default()
                .with_id_column(id_column)
                .with_show_progress(!quiet);

            let mut engine = IcdBioAssign::new(&definitions, config).with_context(|| {
                format!("Failed to load definitions {}", definitions.display())
            })?;
            let revision = IcdRevision::from_icd10_flag(!icd9);
            for extract in &extracts {
                engine
                    .set_definitions(extract, &selection, revision)
                    .with_context(|| format!("Failed to match {}", extract.display()))?;
            }
            engine
                .compile_and_write(&merger, &output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
        }
        Commands::Inspect { definitions, icd9 } => {
            let revision = IcdRevision::from_icd10_flag(!icd9);
            let lookup = CodeLookup::load(&definitions, revision)?;
            println!("{} {revision} phenotypes:", lookup.len());
            for definition in &lookup {
                println!("  {} ({} codes)", definition.name, definition.codes.len());
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
