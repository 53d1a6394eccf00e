//! Table formatting utilities for case lists
//!
//! Columns of a case list depend on the uploaded file, so column
//! definitions are built at runtime rather than declared as constants.
//!
//! # Text Wrapping
//!
//! The table formatter supports text wrapping for narrow terminals:
//! - Use `TableConfig::with_wrap(width)` to enable word-wrapped multi-line rows
//! - CSV and ID formats remain single-line for pipability

use console::style;

use crate::cli::helpers::{
    escape_csv, is_flag_raised, style_status, style_value, truncate_str, wrap_text,
};
use crate::cli::OutputFormat;
use crate::core::{ReviewStatus, MISSING};

/// Configuration for table output
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Maximum width for text columns before wrapping (None = truncate instead)
    pub wrap_width: Option<usize>,
    /// Show summary line after table (e.g., "5 case(s) found")
    pub show_summary: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            wrap_width: None,
            show_summary: true,
        }
    }
}

impl TableConfig {
    /// Create config with text wrapping enabled at the specified width
    pub fn with_wrap(width: usize) -> Self {
        Self {
            wrap_width: Some(width),
            show_summary: true,
        }
    }

    /// Create config optimized for piping (no wrapping, no summary)
    pub fn for_pipe() -> Self {
        Self {
            wrap_width: None,
            show_summary: false,
        }
    }
}

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    /// Plain text, truncated to the column width
    Text(String),
    /// Review status with color coding
    Status(ReviewStatus),
    /// Disagreement flag (raised = red)
    Flag(String),
    /// Value absent or null in the source file
    Missing,
}

impl CellValue {
    /// Wrap a field value, mapping the sentinel to [`CellValue::Missing`]
    pub fn text(value: &str) -> Self {
        if value == MISSING {
            CellValue::Missing
        } else {
            CellValue::Text(value.to_string())
        }
    }

    pub fn flag(value: &str) -> Self {
        if value == MISSING {
            CellValue::Missing
        } else {
            CellValue::Flag(value.to_string())
        }
    }

    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Text(s) => {
                let truncated = truncate_str(s, width.saturating_sub(2));
                format!("{:<width$}", truncated, width = width)
            }
            CellValue::Status(status) => {
                format!("{:<width$}", style_status(status), width = width)
            }
            CellValue::Flag(s) => {
                let truncated = truncate_str(s, width.saturating_sub(2));
                format!("{:<width$}", style_value(&truncated, true), width = width)
            }
            CellValue::Missing => {
                format!("{:<width$}", style(MISSING).dim(), width = width)
            }
        }
    }

    /// Format for CSV output (RFC 4180, no colors)
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Missing => String::new(),
            other => escape_csv(&other.raw()),
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Flag(s) if is_flag_raised(s) => format!("**{}**", s),
            other => other.raw(),
        };
        // Escape pipe characters for markdown tables
        raw.replace('|', "\\|")
    }

    /// Get raw string value (no formatting)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Text(s) | CellValue::Flag(s) => s.clone(),
            CellValue::Status(status) => status.to_string(),
            CellValue::Missing => MISSING.to_string(),
        }
    }

    /// Get the display width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Missing => MISSING.len(),
            other => other.raw().chars().count(),
        }
    }
}

/// Column definition with key, header label and maximum width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub key: String,
    pub header: String,
    pub width: usize,
}

impl ColumnDef {
    pub fn new(key: impl Into<String>, header: impl Into<String>, width: usize) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            width,
        }
    }
}

/// A row of cell values for table output, keyed by address id
pub struct TableRow {
    pub id: String,
    pub cells: Vec<(String, CellValue)>,
}

impl TableRow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: impl Into<String>, value: CellValue) -> Self {
        self.cells.push((key.into(), value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    config: TableConfig,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            config: TableConfig::default(),
        }
    }

    /// Configure the formatter with custom settings
    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Render rows in the specified format
    pub fn render(&self, rows: &[TableRow], format: OutputFormat) -> String {
        let mut out = String::new();
        match format {
            OutputFormat::Csv => self.render_csv(rows, &mut out),
            OutputFormat::Md => self.render_md(rows, &mut out),
            OutputFormat::Id => self.render_ids(rows, &mut out),
            _ => self.render_tsv(rows, &mut out),
        }
        out
    }

    /// Print rows in the specified format
    pub fn output(&self, rows: &[TableRow], format: OutputFormat) {
        print!("{}", self.render(rows, format));
    }

    /// Calculate dynamic column widths based on actual content
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.columns
            .iter()
            .map(|col| {
                let header_len = col.header.chars().count();
                let max_content = rows
                    .iter()
                    .filter_map(|r| r.get(&col.key))
                    .map(|v| v.display_width())
                    .max()
                    .unwrap_or(0);

                // +2 leaves room for the truncation buffer in format_tsv
                let natural_width = header_len.max(max_content.saturating_add(2));
                natural_width.min(col.width.max(header_len))
            })
            .collect()
    }

    fn render_tsv(&self, rows: &[TableRow], out: &mut String) {
        let widths = self.calculate_widths(rows);

        let header_parts: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| format!("{:<width$}", style(&col.header).bold(), width = *w))
            .collect();
        out.push_str(&header_parts.join(" "));
        out.push('\n');

        let total_width: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(total_width));
        out.push('\n');

        for row in rows {
            match self.config.wrap_width {
                Some(wrap_width) => self.render_tsv_row_wrapped(row, &widths, wrap_width, out),
                None => self.render_tsv_row_truncated(row, &widths, out),
            }
        }

        // Summary (unless disabled for piping)
        if self.config.show_summary {
            out.push('\n');
            out.push_str(&format!(
                "{} {}(s) found.\n",
                style(rows.len()).cyan(),
                self.entity_name
            ));
        }
    }

    fn render_tsv_row_truncated(&self, row: &TableRow, widths: &[usize], out: &mut String) {
        let parts: Vec<String> = self
            .columns
            .iter()
            .zip(widths)
            .map(|(col, w)| match row.get(&col.key) {
                Some(value) => value.format_tsv(*w),
                None => CellValue::Missing.format_tsv(*w),
            })
            .collect();
        out.push_str(&parts.join(" "));
        out.push('\n');
    }

    fn render_tsv_row_wrapped(
        &self,
        row: &TableRow,
        widths: &[usize],
        wrap_width: usize,
        out: &mut String,
    ) {
        // Only free text wraps; statuses and flags stay on the first line
        let wrapped_cells: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|col| match row.get(&col.key) {
                Some(CellValue::Text(s)) => wrap_text(s, wrap_width),
                Some(value) => vec![value.raw()],
                None => vec![MISSING.to_string()],
            })
            .collect();

        let max_lines = wrapped_cells.iter().map(|c| c.len()).max().unwrap_or(1);

        for line_idx in 0..max_lines {
            let parts: Vec<String> = wrapped_cells
                .iter()
                .zip(widths)
                .map(|(lines, w)| {
                    let content = lines.get(line_idx).map(String::as_str).unwrap_or("");
                    format!("{:<width$}", content, width = *w)
                })
                .collect();
            out.push_str(parts.join(" ").trim_end());
            out.push('\n');
        }

        // Blank line between multi-line rows for readability
        if max_lines > 1 {
            out.push('\n');
        }
    }

    fn render_csv(&self, rows: &[TableRow], out: &mut String) {
        let headers: Vec<String> = self.columns.iter().map(|c| escape_csv(&c.key)).collect();
        out.push_str(&headers.join(","));
        out.push('\n');

        for row in rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|col| row.get(&col.key).map(CellValue::format_csv).unwrap_or_default())
                .collect();
            out.push_str(&values.join(","));
            out.push('\n');
        }
    }

    fn render_md(&self, rows: &[TableRow], out: &mut String) {
        let headers: Vec<String> = self
            .columns
            .iter()
            .map(|c| c.header.replace('|', "\\|"))
            .collect();
        out.push_str(&format!("| {} |\n", headers.join(" | ")));

        let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
        out.push_str(&format!("|{}|\n", separators.join("|")));

        for row in rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|col| {
                    row.get(&col.key)
                        .unwrap_or(&CellValue::Missing)
                        .format_md()
                })
                .collect();
            out.push_str(&format!("| {} |\n", values.join(" | ")));
        }
    }

    fn render_ids(&self, rows: &[TableRow], out: &mut String) {
        for row in rows {
            out.push_str(&row.id);
            out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::new("addressid", "addressid", 20),
            ColumnDef::new("review_status", "status", 12),
            ColumnDef::new("dp_disagreement", "dp_disagreement", 16),
        ]
    }

    fn rows() -> Vec<TableRow> {
        vec![
            TableRow::new("A1")
                .cell("addressid", CellValue::text("A1"))
                .cell("review_status", CellValue::Status(ReviewStatus::Pending))
                .cell("dp_disagreement", CellValue::flag("Yes")),
            TableRow::new("A2")
                .cell("addressid", CellValue::text("A2"))
                .cell("review_status", CellValue::Status(ReviewStatus::Completed))
                .cell("dp_disagreement", CellValue::flag(MISSING)),
        ]
    }

    #[test]
    fn test_cell_value_text_format() {
        let cell = CellValue::text("Hello World");
        assert!(cell.format_tsv(20).contains("Hello World"));
        assert_eq!(cell.format_csv(), "Hello World");
        assert_eq!(cell.format_md(), "Hello World");
    }

    #[test]
    fn test_cell_value_missing() {
        let cell = CellValue::text(MISSING);
        assert_eq!(cell, CellValue::Missing);
        assert_eq!(cell.format_csv(), "");
        assert_eq!(cell.format_md(), "N/A");
        assert_eq!(cell.raw(), "N/A");
    }

    #[test]
    fn test_cell_value_status_format() {
        let cell = CellValue::Status(ReviewStatus::Completed);
        assert_eq!(cell.format_csv(), "Completed");
        assert_eq!(cell.format_md(), "Completed");
    }

    #[test]
    fn test_cell_value_flag_md_emphasis() {
        assert_eq!(CellValue::flag("Yes").format_md(), "**Yes**");
        assert_eq!(CellValue::flag("No").format_md(), "No");
    }

    #[test]
    fn test_cell_value_md_escapes_pipes() {
        assert_eq!(CellValue::text("a|b|c").format_md(), "a\\|b\\|c");
    }

    #[test]
    fn test_table_row_builder() {
        let row = TableRow::new("A1").cell("addressid", CellValue::text("A1"));
        assert_eq!(row.id, "A1");
        assert!(row.get("addressid").is_some());
        assert!(row.get("week").is_none());
    }

    #[test]
    fn test_render_csv() {
        let cols = columns();
        let out = TableFormatter::new(&cols, "case").render(&rows(), OutputFormat::Csv);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "addressid,review_status,dp_disagreement");
        assert_eq!(lines[1], "A1,Pending,Yes");
        assert_eq!(lines[2], "A2,Completed,");
    }

    #[test]
    fn test_render_md() {
        let cols = columns();
        let out = TableFormatter::new(&cols, "case").render(&rows(), OutputFormat::Md);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "| addressid | status | dp_disagreement |");
        assert_eq!(lines[1], "|---|---|---|");
        assert_eq!(lines[2], "| A1 | Pending | **Yes** |");
        assert_eq!(lines[3], "| A2 | Completed | N/A |");
    }

    #[test]
    fn test_render_ids() {
        let cols = columns();
        let out = TableFormatter::new(&cols, "case").render(&rows(), OutputFormat::Id);
        assert_eq!(out, "A1\nA2\n");
    }

    #[test]
    fn test_render_tsv_summary() {
        let cols = columns();
        let out = TableFormatter::new(&cols, "case").render(&rows(), OutputFormat::Tsv);
        assert!(out.contains("A1"));
        assert!(out.contains("case(s) found."));

        let piped = TableFormatter::new(&cols, "case")
            .with_config(TableConfig::for_pipe())
            .render(&rows(), OutputFormat::Tsv);
        assert!(!piped.contains("found."));
    }

    #[test]
    fn test_table_config_defaults() {
        let config = TableConfig::default();
        assert!(config.wrap_width.is_none());
        assert!(config.show_summary);
        assert_eq!(TableConfig::with_wrap(40).wrap_width, Some(40));
    }
}
