//! Command implementations

pub mod auditors;
pub mod columns;
pub mod completions;
pub mod decide;
pub mod list;
pub mod schema;
pub mod show;
pub mod summary;

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};

use crate::cli::args::StatusFilter;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{load_table, CaseRecord, CaseRepository, Config, SchemaError};

/// Selects the cases of one auditor in a QC file
#[derive(clap::Args, Debug)]
pub struct CaseFilter {
    /// QC file (.csv, .tsv, .xlsx, .xls, .ods)
    pub file: PathBuf,

    /// Auditor whose cases to review (exact, case-sensitive match)
    #[arg(long, short = 'a')]
    pub auditor: String,

    /// Review status filter
    #[arg(long, short = 's', value_enum, default_value = "all")]
    pub status: StatusFilter,
}

impl CaseFilter {
    /// Apply the filter to a loaded repository
    pub fn select<'r>(&self, repo: &'r CaseRepository) -> Vec<&'r CaseRecord> {
        repo.filter(&self.auditor, self.status.as_status().as_ref())
    }
}

/// Load a QC file into a repository using the configured schema
pub fn open_repository(file: &Path, config: &Config) -> Result<CaseRepository> {
    if !file.exists() {
        return Err(miette::miette!("File not found: {}", file.display()));
    }

    let schema = config.schema().map_err(|e| {
        miette::miette!(
            help = "Column overrides are keyed by logical field; run `qcr schema` to list them",
            "Invalid column configuration: {}",
            e
        )
    })?;
    let table = load_table(file).into_diagnostic()?;

    CaseRepository::load(table, schema).map_err(|e: SchemaError| {
        miette::miette!(
            help = "Run `qcr columns <FILE>` to see the detected columns, or map them in .qcr.yaml",
            "{}",
            e
        )
    })
}

/// Pick the effective output format: flag, then config, then the command default
pub fn resolve_format(global: &GlobalOpts, config: &Config, fallback: OutputFormat) -> OutputFormat {
    if global.format != OutputFormat::Auto {
        return global.format;
    }
    config
        .default_format
        .as_deref()
        .and_then(OutputFormat::from_config)
        .filter(|f| *f != OutputFormat::Auto)
        .unwrap_or(fallback)
}

/// Informational message for an empty filter result
pub fn print_no_cases(global: &GlobalOpts) {
    if !global.quiet {
        eprintln!(
            "{} No cases found for this auditor / filter.",
            style("!").yellow()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global(format: OutputFormat) -> GlobalOpts {
        GlobalOpts {
            format,
            quiet: false,
            verbose: false,
        }
    }

    #[test]
    fn test_resolve_format_flag_wins() {
        let config = Config {
            default_format: Some("md".into()),
            ..Config::default()
        };
        assert_eq!(
            resolve_format(&global(OutputFormat::Json), &config, OutputFormat::Tsv),
            OutputFormat::Json
        );
    }

    #[test]
    fn test_resolve_format_config_then_fallback() {
        let config = Config {
            default_format: Some("md".into()),
            ..Config::default()
        };
        assert_eq!(
            resolve_format(&global(OutputFormat::Auto), &config, OutputFormat::Tsv),
            OutputFormat::Md
        );

        let bad = Config {
            default_format: Some("xml".into()),
            ..Config::default()
        };
        assert_eq!(
            resolve_format(&global(OutputFormat::Auto), &bad, OutputFormat::Tsv),
            OutputFormat::Tsv
        );
    }
}
