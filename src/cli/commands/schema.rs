//! `qcr schema` command - show the field to column mapping in effect

use miette::{IntoDiagnostic, Result};
use std::collections::BTreeMap;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::escape_csv;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, Field};

#[derive(clap::Args, Debug)]
pub struct SchemaArgs {
    /// Only show fields whose column differs from the built-in default
    #[arg(long)]
    pub overridden: bool,
}

pub fn run(args: SchemaArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let schema = config.schema().into_diagnostic()?;

    let entries: Vec<(Field, &str)> = schema
        .iter()
        .filter(|(field, column)| !args.overridden || *column != field.default_column())
        .collect();

    match super::resolve_format(global, &config, OutputFormat::Auto) {
        OutputFormat::Json => {
            let map: BTreeMap<&str, &str> = entries.iter().map(|(f, c)| (f.key(), *c)).collect();
            println!("{}", serde_json::to_string_pretty(&map).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            let map: BTreeMap<&str, &str> = entries.iter().map(|(f, c)| (f.key(), *c)).collect();
            print!("{}", serde_yml::to_string(&map).into_diagnostic()?);
        }
        OutputFormat::Tsv => {
            for (field, column) in &entries {
                println!("{}\t{}", field, column);
            }
        }
        OutputFormat::Csv => {
            println!("field,column");
            for (field, column) in &entries {
                println!("{},{}", field, escape_csv(column));
            }
        }
        OutputFormat::Id => {
            for (field, _) in &entries {
                println!("{}", field);
            }
        }
        format @ (OutputFormat::Auto | OutputFormat::Md) => {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Column", "Label"]);
            for (field, column) in &entries {
                builder.push_record([field.key(), *column, field.label()]);
            }
            let mut table = builder.build();
            if format == OutputFormat::Md {
                table.with(Style::markdown());
            } else {
                table.with(Style::rounded());
            }
            println!("{}", table);
        }
    }

    Ok(())
}
