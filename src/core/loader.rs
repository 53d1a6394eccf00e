//! Table loading - reads CSV, TSV and spreadsheet files into rows
//!
//! The loader owns all file I/O. It produces a [`LoadedTable`]: the literal
//! column names of the file plus an ordered list of rows, each holding only
//! its non-blank cells. Interpreting those rows is the repository's job.

use calamine::{open_workbook_auto, Data, ExcelDateTime, Reader};
use chrono::Timelike;
use csv::ReaderBuilder;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while reading an input file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse delimited data: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to open workbook: {0}")]
    Workbook(String),

    #[error("workbook has no worksheet")]
    NoWorksheet,

    #[error("unsupported file type '{0}' (expected csv, tsv, xlsx, xls, xlsm, xlsb or ods)")]
    UnsupportedFormat(String),

    #[error("file has no header row")]
    Empty,
}

/// Input formats, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
    Workbook,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(TableFormat::Csv),
            "tsv" | "tab" => Ok(TableFormat::Tsv),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Ok(TableFormat::Workbook),
            _ => Err(LoadError::UnsupportedFormat(ext)),
        }
    }
}

/// A single row: column name to non-blank, trimmed cell value
pub type Row = HashMap<String, String>;

/// Column names and rows of a loaded file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedTable {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl LoadedTable {
    /// Create an empty table with the given header
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from string literals; empty strings are treated as null
    pub fn from_strings(columns: &[&str], rows: &[&[&str]]) -> Self {
        let mut table = Self::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|v| Some(v.to_string())));
        }
        table
    }

    /// Append a row whose cells are positionally aligned with the header
    ///
    /// Blank cells are dropped, as are cells beyond the last column.
    pub fn push_row<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let row = self
            .columns
            .iter()
            .zip(cells)
            .filter_map(|(column, cell)| {
                let value = cell?.trim().to_string();
                if value.is_empty() {
                    None
                } else {
                    Some((column.clone(), value))
                }
            })
            .collect();
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<Row>) {
        (self.columns, self.rows)
    }
}

/// Load a table from disk, picking the reader by extension
pub fn load_table(path: &Path) -> Result<LoadedTable, LoadError> {
    let format = TableFormat::from_path(path)?;
    debug!(path = %path.display(), ?format, "loading table");

    let table = match format {
        TableFormat::Csv => read_delimited(open(path)?, b',')?,
        TableFormat::Tsv => read_delimited(open(path)?, b'\t')?,
        TableFormat::Workbook => read_workbook(path)?,
    };

    info!(
        path = %path.display(),
        columns = table.columns().len(),
        rows = table.rows().len(),
        "table loaded"
    );
    Ok(table)
}

fn open(path: &Path) -> Result<BufReader<File>, LoadError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Read comma- or tab-separated data with a header row
pub fn read_delimited<R: Read>(reader: R, delimiter: u8) -> Result<LoadedTable, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(LoadError::Empty);
    }

    let mut table = LoadedTable::new(normalize_headers(headers.iter()));
    for result in rdr.records() {
        let record = result?;
        table.push_row(record.iter().map(|cell| Some(cell.to_string())));
    }
    Ok(table)
}

/// Read the first worksheet of a spreadsheet
pub fn read_workbook(path: &Path) -> Result<LoadedTable, LoadError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| LoadError::Workbook(e.to_string()))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(LoadError::NoWorksheet)?;
    debug!(sheet = %sheet, "reading first worksheet");

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| LoadError::Workbook(e.to_string()))?;

    let mut rows = range.rows();
    let header = rows.next().ok_or(LoadError::Empty)?;
    let headers: Vec<String> = header
        .iter()
        .map(|c| cell_string(c).unwrap_or_default())
        .collect();

    let mut table = LoadedTable::new(normalize_headers(headers.iter().map(String::as_str)));
    for row in rows {
        table.push_row(row.iter().map(cell_string));
    }
    Ok(table)
}

fn cell_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.trim().to_string()),
        Data::Float(v) => Some(format!("{v}")),
        Data::Int(v) => Some(format!("{v}")),
        Data::Bool(v) => Some(if *v { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => Some(datetime_string(dt)),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

/// Render an Excel serial date as `YYYY-MM-DD`, adding the time when it is not midnight
fn datetime_string(dt: &ExcelDateTime) -> String {
    if dt.is_duration() {
        return match dt.as_duration() {
            Some(d) => {
                let secs = d.num_seconds();
                format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
            }
            None => dt.to_string(),
        };
    }
    match dt.as_datetime() {
        Some(ndt) if ndt.time().num_seconds_from_midnight() == 0 => {
            ndt.format("%Y-%m-%d").to_string()
        }
        Some(ndt) => ndt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => dt.to_string(),
    }
}

/// Trim header names and make them unique
///
/// Blank headers get a positional placeholder name. Repeated names keep the
/// first occurrence as-is and suffix later ones `.1`, `.2`, ...
fn normalize_headers<'a, I>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<String, usize> = HashMap::new();
    let mut columns = Vec::new();

    for (idx, h) in headers.into_iter().enumerate() {
        let h = h.trim();
        let base = if h.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            h.to_string()
        };

        let name = if seen.contains(&base) {
            let n = next_suffix.entry(base.clone()).or_insert(0);
            let renamed = loop {
                *n += 1;
                let candidate = format!("{}.{}", base, n);
                if !seen.contains(&candidate) {
                    break candidate;
                }
            };
            warn!(column = %base, renamed = %renamed, "duplicate column header");
            renamed
        } else {
            base
        };

        seen.insert(name.clone());
        columns.push(name);
    }
    columns
}
