//! `qcr summary` command - case counts for one auditor

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use serde_json::Value;

use crate::cli::helpers::escape_csv;
use crate::cli::table::{TableConfig, TableFormatter};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, StatusSummary};

use super::list::{case_objects, case_table};
use super::{open_repository, print_no_cases, resolve_format, CaseFilter};

#[derive(clap::Args, Debug)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub filter: CaseFilter,

    /// Also show the first N cases, as `qcr list -n N` would
    #[arg(long, value_name = "N")]
    pub preview: Option<usize>,
}

#[derive(Serialize)]
struct SummaryReport<'a> {
    auditor: &'a str,
    #[serde(flatten)]
    summary: StatusSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    preview: Option<Vec<Value>>,
}

pub fn run(args: SummaryArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let repo = open_repository(&args.filter.file, &config)?;
    let cases = args.filter.select(&repo);

    if cases.is_empty() {
        print_no_cases(global);
        return Ok(());
    }

    let preview_cases = &cases[..args.preview.unwrap_or(0).min(cases.len())];
    let format = resolve_format(global, &config, OutputFormat::Auto);
    let report = SummaryReport {
        auditor: &args.filter.auditor,
        summary: StatusSummary::of(cases.iter().copied()),
        preview: args
            .preview
            .filter(|_| matches!(format, OutputFormat::Json | OutputFormat::Yaml))
            .map(|_| case_objects(&repo, preview_cases, false)),
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&report).into_diagnostic()?);
        }
        OutputFormat::Tsv | OutputFormat::Id => {
            println!(
                "{}\t{}\t{}\t{}",
                report.auditor, report.summary.total, report.summary.pending, report.summary.completed
            );
        }
        OutputFormat::Csv => {
            println!("auditor,total,pending,completed");
            println!(
                "{},{},{},{}",
                escape_csv(report.auditor),
                report.summary.total,
                report.summary.pending,
                report.summary.completed
            );
        }
        OutputFormat::Md => {
            println!("## Summary for auditor: {}\n", report.auditor);
            println!("| Total cases | Pending | Completed |");
            println!("|---|---|---|");
            println!(
                "| {} | {} | {} |",
                report.summary.total, report.summary.pending, report.summary.completed
            );
            if args.preview.is_some() {
                println!();
                let (defs, rows) = case_table(&repo, preview_cases, false);
                TableFormatter::new(&defs, "case")
                    .with_config(TableConfig::for_pipe())
                    .output(&rows, OutputFormat::Md);
            }
        }
        OutputFormat::Auto => {
            println!(
                "{}",
                style(format!("Summary for auditor: {}", report.auditor))
                    .bold()
                    .underlined()
            );
            println!();
            println!("  Total cases:  {}", style(report.summary.total).cyan());
            println!("  Pending:      {}", style(report.summary.pending).yellow());
            println!("  Completed:    {}", style(report.summary.completed).green());
            if args.preview.is_some() {
                println!();
                println!("{}", style("Preview").bold());
                let (defs, rows) = case_table(&repo, preview_cases, false);
                TableFormatter::new(&defs, "case")
                    .with_config(TableConfig::for_pipe())
                    .output(&rows, OutputFormat::Tsv);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CaseRepository, LoadedTable, SchemaRegistry};

    #[test]
    fn test_report_includes_preview_only_when_requested() {
        let repo = CaseRepository::load(
            LoadedTable::from_strings(
                &["auditor", "addressid", "review_status"],
                &[&["Alice", "A1", ""], &["Alice", "A2", "Completed"]],
            ),
            SchemaRegistry::default(),
        )
        .unwrap();
        let cases = repo.filter("Alice", None);

        let bare = SummaryReport {
            auditor: "Alice",
            summary: StatusSummary::of(cases.iter().copied()),
            preview: None,
        };
        let json = serde_json::to_value(&bare).unwrap();
        assert_eq!(json["total"], 2);
        assert!(json.get("preview").is_none());

        let with_preview = SummaryReport {
            preview: Some(case_objects(&repo, &cases[..1], false)),
            ..bare
        };
        let json = serde_json::to_value(&with_preview).unwrap();
        assert_eq!(json["pending"], 1);
        assert_eq!(json["preview"].as_array().unwrap().len(), 1);
        assert_eq!(json["preview"][0]["addressid"], "A1");
    }
}
