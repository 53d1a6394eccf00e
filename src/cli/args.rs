//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    auditors::AuditorsArgs, columns::ColumnsArgs, completions::CompletionsArgs,
    decide::DecideArgs, list::ListArgs, schema::SchemaArgs, show::ShowArgs,
    summary::SummaryArgs,
};
use crate::core::ReviewStatus;

#[derive(Parser)]
#[command(name = "qcr")]
#[command(author, version, about = "QC Review Toolkit")]
#[command(long_about = "Review address-geocoding QC audit files: filter cases by auditor and review status, inspect DP / RE / geofence buckets, and capture agree/appeal decisions.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the columns detected in a QC file and how fields resolve to them
    Columns(ColumnsArgs),

    /// Show the logical field to column mapping in effect
    Schema(SchemaArgs),

    /// List the auditors present in a QC file
    Auditors(AuditorsArgs),

    /// Summarize case counts for an auditor
    Summary(SummaryArgs),

    /// List cases for an auditor
    List(ListArgs),

    /// Show the DP / RE / geofence breakdown of one case
    Show(ShowArgs),

    /// Record an agree/appeal decision for one case (session only)
    Decide(DecideArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (tables for lists, sections for detail)
    #[default]
    Auto,
    /// YAML format
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just address IDs (or names), one per line
    Id,
}

impl OutputFormat {
    /// Parse a format name from configuration
    pub fn from_config(name: &str) -> Option<Self> {
        OutputFormat::from_str(name, true).ok()
    }
}

/// Review status filter; `all` means no status restriction
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    pub fn as_status(self) -> Option<ReviewStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Pending => Some(ReviewStatus::Pending),
            StatusFilter::Completed => Some(ReviewStatus::Completed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_status_filter_mapping() {
        assert_eq!(StatusFilter::All.as_status(), None);
        assert_eq!(StatusFilter::Pending.as_status(), Some(ReviewStatus::Pending));
        assert_eq!(StatusFilter::Completed.as_status(), Some(ReviewStatus::Completed));
    }

    #[test]
    fn test_output_format_from_config() {
        assert_eq!(OutputFormat::from_config("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_config("MD"), Some(OutputFormat::Md));
        assert_eq!(OutputFormat::from_config("xml"), None);
    }
}
