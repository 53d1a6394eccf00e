//! `qcr list` command - cases table for one auditor

use miette::{IntoDiagnostic, Result};
use serde_json::{Map, Value};

use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{CaseRecord, CaseRepository, Config, Field, MISSING};

use super::{open_repository, print_no_cases, resolve_format, CaseFilter};

/// Fields shown in the cases table, when present in the file
const LIST_FIELDS: [Field; 9] = [
    Field::AddressId,
    Field::Week,
    Field::Program,
    Field::TrackingId,
    Field::Status,
    Field::Qc2Re,
    Field::DpDisagreement,
    Field::ReDisagreement,
    Field::GeofenceDisagreement,
];

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: CaseFilter,

    /// Show every column of the file instead of the review subset
    #[arg(long)]
    pub all_columns: bool,

    /// Wrap long text at this width instead of truncating
    #[arg(long, short = 'w')]
    pub wrap: Option<usize>,

    /// Maximum number of cases to show
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

/// How a table column obtains its value from a record
enum Source {
    Field(Field),
    Column(String),
}

struct ListColumn {
    def: ColumnDef,
    source: Source,
}

fn review_columns(repo: &CaseRepository) -> Vec<ListColumn> {
    let schema = repo.schema();
    LIST_FIELDS
        .iter()
        .filter(|f| **f == Field::Status || repo.has_column(schema.column(**f)))
        .map(|f| {
            let column = schema.column(*f);
            let width = if *f == Field::AddressId { 24 } else { 20 };
            ListColumn {
                def: ColumnDef::new(column, column, width),
                source: Source::Field(*f),
            }
        })
        .collect()
}

fn file_columns(repo: &CaseRepository) -> Vec<ListColumn> {
    let status_col = repo.schema().column(Field::Status);
    let mut columns: Vec<ListColumn> = repo
        .columns()
        .iter()
        .map(|c| {
            let source = if c == status_col {
                Source::Field(Field::Status)
            } else {
                Source::Column(c.clone())
            };
            ListColumn {
                def: ColumnDef::new(c.as_str(), c.as_str(), 30),
                source,
            }
        })
        .collect();

    // The status column exists for every loaded file, even if created at load time
    if !repo.has_column(status_col) {
        columns.push(ListColumn {
            def: ColumnDef::new(status_col, status_col, 12),
            source: Source::Field(Field::Status),
        });
    }
    columns
}

fn cell_for(repo: &CaseRepository, record: &CaseRecord, source: &Source) -> CellValue {
    match source {
        Source::Field(Field::Status) => CellValue::Status(record.status().clone()),
        Source::Field(field) if field.is_disagreement() => {
            CellValue::flag(repo.field(record, *field))
        }
        Source::Field(field) => CellValue::text(repo.field(record, *field)),
        Source::Column(column) => CellValue::text(record.value(column).unwrap_or(MISSING)),
    }
}

fn list_columns(repo: &CaseRepository, all_columns: bool) -> Vec<ListColumn> {
    if all_columns {
        file_columns(repo)
    } else {
        review_columns(repo)
    }
}

/// Cases as JSON objects keyed by column name
pub(super) fn case_objects(
    repo: &CaseRepository,
    cases: &[&CaseRecord],
    all_columns: bool,
) -> Vec<Value> {
    let columns = list_columns(repo, all_columns);
    cases
        .iter()
        .map(|record| {
            let map: Map<String, Value> = columns
                .iter()
                .map(|c| {
                    let value = cell_for(repo, record, &c.source).raw();
                    (c.def.key.clone(), Value::String(value))
                })
                .collect();
            Value::Object(map)
        })
        .collect()
}

/// Column definitions and rows for the cases table
pub(super) fn case_table(
    repo: &CaseRepository,
    cases: &[&CaseRecord],
    all_columns: bool,
) -> (Vec<ColumnDef>, Vec<TableRow>) {
    let columns = list_columns(repo, all_columns);
    let defs = columns.iter().map(|c| c.def.clone()).collect();
    let rows = cases
        .iter()
        .map(|record| {
            let id = repo.field(record, Field::AddressId).to_string();
            columns.iter().fold(TableRow::new(id), |row, c| {
                row.cell(c.def.key.clone(), cell_for(repo, record, &c.source))
            })
        })
        .collect();
    (defs, rows)
}

pub fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let repo = open_repository(&args.filter.file, &config)?;

    let mut cases = args.filter.select(&repo);
    if let Some(limit) = args.limit {
        cases.truncate(limit);
    }

    if cases.is_empty() {
        print_no_cases(global);
        return Ok(());
    }

    let format = resolve_format(global, &config, OutputFormat::Tsv);
    match format {
        OutputFormat::Json => {
            let objects = case_objects(&repo, &cases, args.all_columns);
            println!("{}", serde_json::to_string_pretty(&objects).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            let objects = case_objects(&repo, &cases, args.all_columns);
            print!("{}", serde_yml::to_string(&objects).into_diagnostic()?);
        }
        _ => {
            let (defs, rows) = case_table(&repo, &cases, args.all_columns);

            let table_config = if global.quiet {
                TableConfig::for_pipe()
            } else if let Some(width) = args.wrap.or(config.wrap_width) {
                TableConfig::with_wrap(width)
            } else {
                TableConfig::default()
            };

            TableFormatter::new(&defs, "case")
                .with_config(table_config)
                .output(&rows, format);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LoadedTable, SchemaRegistry};

    fn repo(columns: &[&str], rows: &[&[&str]]) -> CaseRepository {
        CaseRepository::load(
            LoadedTable::from_strings(columns, rows),
            SchemaRegistry::default(),
        )
        .unwrap()
    }

    fn keys(columns: &[ListColumn]) -> Vec<&str> {
        columns.iter().map(|c| c.def.key.as_str()).collect()
    }

    #[test]
    fn test_review_columns_only_include_present_fields() {
        let repo = repo(
            &["auditor", "addressid", "week", "dp_disagreement", "extra"],
            &[&["Alice", "A1", "W1", "Yes", "x"]],
        );
        assert_eq!(
            keys(&review_columns(&repo)),
            vec!["addressid", "week", "review_status", "dp_disagreement"]
        );
    }

    #[test]
    fn test_file_columns_append_status_when_absent() {
        let repo = repo(&["auditor", "addressid"], &[&["Alice", "A1"]]);
        assert_eq!(
            keys(&file_columns(&repo)),
            vec!["auditor", "addressid", "review_status"]
        );
    }

    #[test]
    fn test_case_objects_and_table_agree() {
        let repo = repo(
            &["auditor", "addressid", "week"],
            &[&["Alice", "A1", "W1"], &["Alice", "A2", ""]],
        );
        let cases = repo.filter("Alice", None);

        let objects = case_objects(&repo, &cases, false);
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[1]["addressid"], "A2");
        assert_eq!(objects[1]["week"], "N/A");
        assert_eq!(objects[1]["review_status"], "Pending");

        let (defs, rows) = case_table(&repo, &cases, false);
        assert_eq!(defs.len(), 3);
        assert_eq!(rows[0].id, "A1");
        assert_eq!(rows[1].get("week"), Some(&CellValue::Missing));
    }

    #[test]
    fn test_cell_for_status_and_flags() {
        let repo = repo(
            &["auditor", "addressid", "review_status", "dp_disagreement"],
            &[&["Alice", "A1", "", "Yes"]],
        );
        let record = &repo.records()[0];
        assert_eq!(
            cell_for(&repo, record, &Source::Field(Field::Status)),
            CellValue::Status(crate::core::ReviewStatus::Pending)
        );
        assert_eq!(
            cell_for(&repo, record, &Source::Field(Field::DpDisagreement)),
            CellValue::Flag("Yes".to_string())
        );
        assert_eq!(
            cell_for(&repo, record, &Source::Field(Field::Week)),
            CellValue::Missing
        );
        assert_eq!(
            cell_for(&repo, record, &Source::Column("nope".into())),
            CellValue::Missing
        );
    }
}
