//! `qcr decide` command - capture an agree/appeal decision for one case
//!
//! Decisions live only for the duration of the command. Nothing is written
//! back into the QC file and the case status is left untouched.

use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, Decision, DecisionRecord, DecisionSink, Field, SessionDecisions};

use super::show::select_case;
use super::{open_repository, print_no_cases, resolve_format, CaseFilter};

#[derive(clap::Args, Debug)]
pub struct DecideArgs {
    #[command(flatten)]
    pub filter: CaseFilter,

    /// Address id of the case
    #[arg(long, short = 'c')]
    pub case: String,

    /// Decision (agree, appeal); prompted for when omitted
    #[arg(long, short = 'd')]
    pub decision: Option<Decision>,

    /// Notes or appeal text
    #[arg(long, short = 'n')]
    pub notes: Option<String>,
}

pub fn run(args: DecideArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let repo = open_repository(&args.filter.file, &config)?;
    let cases = args.filter.select(&repo);

    if cases.is_empty() {
        print_no_cases(global);
        return Ok(());
    }

    let record = select_case(&cases, Some(args.case.as_str())).ok_or_else(|| {
        miette::miette!(
            "Case '{}' not found for auditor '{}'",
            args.case,
            args.filter.auditor
        )
    })?;
    let address_id = repo.field(record, Field::AddressId);

    // dialoguer prompts on stderr, so stdout may be piped
    let interactive = Term::stderr().is_term();
    let decision = match args.decision {
        Some(d) => d,
        None if interactive => prompt_decision()?,
        None => {
            return Err(miette::miette!(
                help = "Pass --decision agree or --decision appeal",
                "No decision given and the terminal is not interactive"
            ))
        }
    };

    let notes = match args.notes {
        Some(n) => n,
        None if interactive && decision == Decision::Appeal => prompt_notes()?,
        None => String::new(),
    };

    let mut sink = SessionDecisions::new();
    let saved = sink
        .save_decision(address_id, decision, &notes)
        .into_diagnostic()?;

    print_saved(saved, global, resolve_format(global, &config, OutputFormat::Auto))
}

fn prompt_decision() -> Result<Decision> {
    let labels: Vec<&str> = Decision::ALL.iter().map(|d| d.label()).collect();
    let idx = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Choose action for this case")
        .items(&labels)
        .default(0)
        .interact()
        .into_diagnostic()?;
    Ok(Decision::ALL[idx])
}

fn prompt_notes() -> Result<String> {
    Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt("Your notes / appeal text")
        .allow_empty(true)
        .interact_text()
        .into_diagnostic()
}

fn print_saved(saved: &DecisionRecord, global: &GlobalOpts, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(saved).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(saved).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", saved.address_id),
        _ => {
            println!(
                "{} Decision for case {}: {}",
                style("✓").green(),
                style(&saved.address_id).cyan(),
                style(saved.decision).bold()
            );
            if saved.decision == Decision::Appeal {
                println!("Saved appeal text:");
                println!("{}", saved.notes.as_deref().unwrap_or("(none)"));
            } else if let Some(notes) = &saved.notes {
                println!("Notes: {}", notes);
            }
            if !global.quiet {
                eprintln!(
                    "{}",
                    style("Decisions are kept for this session only; the QC file is not modified.")
                        .dim()
                );
            }
        }
    }
    Ok(())
}
