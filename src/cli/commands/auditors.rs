//! `qcr auditors` command - list the auditors present in a QC file

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::helpers::escape_csv;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, StatusSummary};

use super::{open_repository, resolve_format};

#[derive(clap::Args, Debug)]
pub struct AuditorsArgs {
    /// QC file (.csv, .tsv, .xlsx, .xls, .ods)
    pub file: PathBuf,

    /// Include per-auditor case counts
    #[arg(long)]
    pub counts: bool,
}

#[derive(Serialize)]
struct AuditorRow {
    auditor: String,
    #[serde(flatten)]
    summary: StatusSummary,
}

pub fn run(args: AuditorsArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let repo = open_repository(&args.file, &config)?;
    let auditors = repo.distinct_auditors();

    if auditors.is_empty() {
        if !global.quiet {
            eprintln!("{} No auditors found in {}", style("!").yellow(), args.file.display());
        }
        return Ok(());
    }

    let rows: Vec<AuditorRow> = auditors
        .into_iter()
        .map(|auditor| {
            let summary = StatusSummary::of(repo.filter(&auditor, None));
            AuditorRow { auditor, summary }
        })
        .collect();

    match resolve_format(global, &config, OutputFormat::Tsv) {
        OutputFormat::Json if args.counts => {
            println!("{}", serde_json::to_string_pretty(&rows).into_diagnostic()?);
        }
        OutputFormat::Json => {
            let names: Vec<&str> = rows.iter().map(|r| r.auditor.as_str()).collect();
            println!("{}", serde_json::to_string_pretty(&names).into_diagnostic()?);
        }
        OutputFormat::Yaml if args.counts => {
            print!("{}", serde_yml::to_string(&rows).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            let names: Vec<&str> = rows.iter().map(|r| r.auditor.as_str()).collect();
            print!("{}", serde_yml::to_string(&names).into_diagnostic()?);
        }
        OutputFormat::Csv if args.counts => {
            println!("auditor,total,pending,completed");
            for row in &rows {
                println!(
                    "{},{},{},{}",
                    escape_csv(&row.auditor),
                    row.summary.total,
                    row.summary.pending,
                    row.summary.completed
                );
            }
        }
        _ if args.counts => {
            for row in &rows {
                println!(
                    "{}\t{}\t{}\t{}",
                    row.auditor, row.summary.total, row.summary.pending, row.summary.completed
                );
            }
        }
        _ => {
            for row in &rows {
                println!("{}", row.auditor);
            }
        }
    }

    Ok(())
}
