//! `qcr columns` command - detected columns and field resolution
//!
//! Unlike the other commands this one does not require the essential
//! columns to be present: it exists to diagnose files that fail to load.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{load_table, Config, Field};

use super::resolve_format;

#[derive(clap::Args, Debug)]
pub struct ColumnsArgs {
    /// QC file (.csv, .tsv, .xlsx, .xls, .ods)
    pub file: PathBuf,
}

#[derive(Serialize)]
struct FieldResolution {
    field: Field,
    column: String,
    present: bool,
}

#[derive(Serialize)]
struct ColumnsReport {
    columns: Vec<String>,
    fields: Vec<FieldResolution>,
    missing_essential: Vec<String>,
}

pub fn run(args: ColumnsArgs, global: &GlobalOpts) -> Result<()> {
    if !args.file.exists() {
        return Err(miette::miette!("File not found: {}", args.file.display()));
    }

    let config = Config::load();
    let schema = config.schema().into_diagnostic()?;
    let table = load_table(&args.file).into_diagnostic()?;

    let fields: Vec<FieldResolution> = schema
        .iter()
        .map(|(field, column)| FieldResolution {
            field,
            column: column.to_string(),
            // The status column is created at load time when absent
            present: table.has_column(column) || field == Field::Status,
        })
        .collect();
    let missing_essential: Vec<String> = fields
        .iter()
        .filter(|f| Field::MANDATORY.contains(&f.field) && !f.present)
        .map(|f| f.column.clone())
        .collect();

    let report = ColumnsReport {
        columns: table.columns().to_vec(),
        fields,
        missing_essential,
    };

    let format = resolve_format(global, &config, OutputFormat::Auto);
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&report).into_diagnostic()?);
        }
        OutputFormat::Id => {
            for column in &report.columns {
                println!("{}", column);
            }
        }
        OutputFormat::Tsv | OutputFormat::Csv => {
            let sep = if format == OutputFormat::Csv { "," } else { "\t" };
            println!("field{sep}column{sep}present");
            for f in &report.fields {
                println!("{}{sep}{}{sep}{}", f.field, f.column, f.present);
            }
        }
        OutputFormat::Auto | OutputFormat::Md => {
            print_human(&report, format == OutputFormat::Md);
        }
    }

    if !report.missing_essential.is_empty() && !global.quiet {
        eprintln!(
            "{} These essential columns are missing in the file: {}",
            style("✗").red(),
            report.missing_essential.join(", ")
        );
    }

    Ok(())
}

fn print_human(report: &ColumnsReport, markdown: bool) {
    println!(
        "{} ({})",
        style("Detected columns").bold(),
        report.columns.len()
    );
    for column in &report.columns {
        println!("  {}", column);
    }
    println!();

    let mut builder = Builder::default();
    builder.push_record(["Field", "Column", "Present"]);
    for f in &report.fields {
        let mark = if f.present { "yes" } else { "no" };
        builder.push_record([f.field.key(), f.column.as_str(), mark]);
    }

    let mut table = builder.build();
    if markdown {
        table.with(Style::markdown());
    } else {
        table.with(Style::rounded());
    }
    println!("{}", table);
}
