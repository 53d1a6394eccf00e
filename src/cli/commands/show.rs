//! `qcr show` command - DP / RE / geofence breakdown of one case

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::cli::helpers::{escape_csv, style_status, style_value, wrap_text};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{CaseRecord, CaseRepository, Config, Field};

use super::{open_repository, print_no_cases, resolve_format, CaseFilter};

/// A titled group of fields in the case detail view
pub struct Section {
    pub title: &'static str,
    pub fields: &'static [Field],
}

/// Case detail layout; action taken is shown under both geocode buckets
pub const SECTIONS: [Section; 5] = [
    Section {
        title: "Basic information",
        fields: &[
            Field::AddressId,
            Field::Auditor,
            Field::Week,
            Field::Program,
            Field::TrackingId,
            Field::Status,
        ],
    },
    Section {
        title: "Delivery Point (DP)",
        fields: &[
            Field::PreDpGeocodes,
            Field::DpGeocodes,
            Field::AuditorDpGranularity,
            Field::QcDpGranularity,
            Field::Qc2Dp,
            Field::DpDisagreement,
            Field::ReasonDp,
            Field::ActionTaken,
        ],
    },
    Section {
        title: "Road Entry (RE)",
        fields: &[
            Field::PreReGeocodes,
            Field::ReGeocodes,
            Field::AuditorReGranularity,
            Field::QcReGranularity,
            Field::Qc2Re,
            Field::ReDisagreement,
            Field::ReasonRe,
            Field::ActionTaken,
        ],
    },
    Section {
        title: "Geofence",
        fields: &[
            Field::PreTolerance,
            Field::PostTolerance,
            Field::Qc2Tolerance,
            Field::GeofenceDisagreement,
            Field::ReasonGeofence,
        ],
    },
    Section {
        title: "Overall comments & QC notes",
        fields: &[
            Field::AuditorComment,
            Field::Qc2Comment,
            Field::Qc2Source,
            Field::Qc2GamIssue,
        ],
    },
];

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub filter: CaseFilter,

    /// Address id of the case (default: first case in the filtered list)
    #[arg(long, short = 'c')]
    pub case: Option<String>,

    /// Wrap long values at this width
    #[arg(long, short = 'w')]
    pub wrap: Option<usize>,
}

#[derive(Serialize)]
struct CaseDetail<'a> {
    row: usize,
    fields: BTreeMap<&'static str, &'a str>,
}

/// Pick the case to show from a filtered list
///
/// With no id the first case is used. Ids are matched against the address
/// id as read from the file, so a blank id never matches; duplicates
/// resolve to the first match.
pub fn select_case<'r>(
    cases: &[&'r CaseRecord],
    case_id: Option<&str>,
) -> Option<&'r CaseRecord> {
    match case_id {
        Some(id) => cases
            .iter()
            .copied()
            .find(|r| r.address_id() == Some(id)),
        None => cases.first().copied(),
    }
}

pub fn run(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let repo = open_repository(&args.filter.file, &config)?;
    let cases = args.filter.select(&repo);

    if cases.is_empty() {
        print_no_cases(global);
        return Ok(());
    }

    let record = select_case(&cases, args.case.as_deref()).ok_or_else(|| {
        miette::miette!(
            help = "Run `qcr list` with the same filters to see the available address ids",
            "Case '{}' not found for auditor '{}'",
            args.case.as_deref().unwrap_or_default(),
            args.filter.auditor
        )
    })?;

    let format = resolve_format(global, &config, OutputFormat::Auto);
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&detail(&repo, record)).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&detail(&repo, record)).into_diagnostic()?);
        }
        OutputFormat::Id => {
            println!("{}", repo.field(record, Field::AddressId));
        }
        OutputFormat::Md => print!("{}", render_markdown(&repo, record)),
        OutputFormat::Csv => {
            println!("field,value");
            for field in Field::ALL {
                println!("{},{}", field, escape_csv(repo.field(record, field)));
            }
        }
        OutputFormat::Tsv => {
            for field in Field::ALL {
                println!("{}\t{}", field, repo.field(record, field));
            }
        }
        OutputFormat::Auto => {
            let wrap = args.wrap.or(config.wrap_width);
            print_sections(&repo, record, wrap);
        }
    }

    Ok(())
}

fn detail<'a>(repo: &'a CaseRepository, record: &'a CaseRecord) -> CaseDetail<'a> {
    CaseDetail {
        row: record.row(),
        fields: Field::ALL
            .iter()
            .map(|f| (f.key(), repo.field(record, *f)))
            .collect(),
    }
}

fn print_sections(repo: &CaseRepository, record: &CaseRecord, wrap: Option<usize>) {
    println!(
        "{}",
        style("Case detail: DP / RE / Geofence breakdown").bold().underlined()
    );

    for section in &SECTIONS {
        println!();
        println!("{}", style(section.title).bold());
        for field in section.fields {
            let value = repo.field(record, *field);
            let label = format!("{}:", field.label());
            let lines = match wrap {
                Some(width) => wrap_text(value, width),
                None => vec![value.to_string()],
            };
            let indent = " ".repeat(label.chars().count() + 3);
            for (i, line) in lines.iter().enumerate() {
                let styled = if *field == Field::Status {
                    style_status(record.status()).to_string()
                } else {
                    style_value(line, field.is_disagreement()).to_string()
                };
                if i == 0 {
                    println!("  {} {}", style(&label).dim(), styled);
                } else {
                    println!("{}{}", indent, styled);
                }
            }
        }
    }
}

/// Markdown rendering of the case detail
pub fn render_markdown(repo: &CaseRepository, record: &CaseRecord) -> String {
    let mut out = format!(
        "## Case {}\n",
        repo.field(record, Field::AddressId)
    );
    for section in &SECTIONS {
        out.push_str(&format!("\n### {}\n\n", section.title));
        for field in section.fields {
            out.push_str(&format!(
                "- **{}:** {}\n",
                field.label(),
                repo.field(record, *field)
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LoadedTable, SchemaRegistry};

    fn repo() -> CaseRepository {
        CaseRepository::load(
            LoadedTable::from_strings(
                &["auditor", "addressid", "dp_geocodes", "qc2_comment"],
                &[
                    &["Alice", "A1", "47.61,-122.33", "Pin on neighbour roof"],
                    &["Alice", "A2", "", ""],
                    &["Alice", "A1", "0,0", ""],
                    &["Alice", "", "1,1", "no id"],
                ],
            ),
            SchemaRegistry::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_sections_cover_every_field() {
        for field in Field::ALL {
            assert!(
                SECTIONS.iter().any(|s| s.fields.contains(&field)),
                "{} is not shown in any section",
                field
            );
        }
    }

    #[test]
    fn test_select_case_defaults_to_first() {
        let repo = repo();
        let cases = repo.filter("Alice", None);
        let record = select_case(&cases, None).unwrap();
        assert_eq!(record.address_id(), Some("A1"));
    }

    #[test]
    fn test_select_case_first_match_wins() {
        let repo = repo();
        let cases = repo.filter("Alice", None);
        let record = select_case(&cases, Some("A1")).unwrap();
        assert_eq!(repo.field(record, Field::DpGeocodes), "47.61,-122.33");
        assert!(select_case(&cases, Some("Z9")).is_none());
    }

    #[test]
    fn test_select_case_ignores_blank_ids() {
        let repo = repo();
        let cases = repo.filter("Alice", None);
        assert!(select_case(&cases, Some("N/A")).is_none());
        assert!(repo.find("Alice", None, "N/A").is_none());
    }

    #[test]
    fn test_render_markdown_uses_sentinel() {
        let repo = repo();
        let cases = repo.filter("Alice", None);
        let record = select_case(&cases, Some("A2")).unwrap();
        let md = render_markdown(&repo, record);
        assert!(md.starts_with("## Case A2\n"));
        assert!(md.contains("### Delivery Point (DP)"));
        assert!(md.contains("- **DP geocodes (after auditing):** N/A"));
        assert!(md.contains("- **status:** Pending"));
    }

    #[test]
    fn test_detail_lists_all_fields() {
        let repo = repo();
        let record = &repo.records()[0];
        let detail = detail(&repo, record);
        assert_eq!(detail.fields.len(), Field::ALL.len());
        assert_eq!(detail.fields["qc2_comment"], "Pin on neighbour roof");
        assert_eq!(detail.fields["week"], "N/A");
    }
}
