//! Table formatting utilities for CLI list commands
//!
//! Unified table output for the diff/motors listings: typed cell values
//! with change-aware coloring, dynamic column widths, and tsv/csv/md
//! renderings from the same rows.

use console::style;

use crate::cli::helpers::{escape_csv, truncate_str};
use crate::cli::OutputFormat;
use crate::entities::{ChangeType, MassStatus};

/// Configuration for table output
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Show summary line after table (e.g., "5 change(s) shown")
    pub show_summary: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { show_summary: true }
    }
}

impl TableConfig {
    /// Create config optimized for piping (no summary)
    pub fn for_pipe() -> Self {
        Self {
            show_summary: false,
        }
    }
}

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Vehicle key (cyan colored)
    Key(String),
    /// Plain text, truncated to the column width
    Text(String),
    /// Change classification with color coding
    Change(ChangeType),
    /// Mass direction with color coding
    Mass(MassStatus),
    /// Numeric value
    Number(i64),
    /// Float value with precision
    Float(f64, usize),
    /// Optional sheet row number
    Row(Option<u32>),
    /// Empty/placeholder
    Empty,
}

impl CellValue {
    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Key(k) => {
                format!("{:<width$}", style(k).cyan(), width = width)
            }
            CellValue::Text(s) => {
                let truncated = truncate_str(s, width.saturating_sub(2));
                format!("{:<width$}", truncated, width = width)
            }
            CellValue::Change(ct) => {
                let s = ct.label();
                let styled = match ct {
                    ChangeType::New => style(s).red().bold(),
                    ChangeType::Removed => style(s).magenta(),
                    ChangeType::SpringChanged => style(s).yellow(),
                    ChangeType::Modified => style(s).blue(),
                    ChangeType::Unchanged => style(s).dim(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Mass(ms) => {
                let s = ms.to_string();
                let styled = match ms {
                    MassStatus::Increased => style(&s).yellow(),
                    MassStatus::Decreased => style(&s).cyan(),
                    MassStatus::Unchanged => style(&s).dim(),
                    MassStatus::Unknown => style(&s).dim(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Number(n) => {
                format!("{:>width$}", n, width = width)
            }
            CellValue::Float(f, precision) => {
                format!("{:>width$.prec$}", f, width = width, prec = precision)
            }
            CellValue::Row(opt) => match opt {
                Some(r) => format!("{:>width$}", r, width = width),
                None => format!("{:>width$}", "-", width = width),
            },
            CellValue::Empty => format!("{:<width$}", "-", width = width),
        }
    }

    /// Format for CSV output (RFC 4180, no colors)
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Key(k) => escape_csv(k),
            CellValue::Text(s) => escape_csv(s),
            CellValue::Change(ct) => ct.to_string(),
            CellValue::Mass(ms) => ms.to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Float(f, precision) => format!("{:.prec$}", f, prec = precision),
            CellValue::Row(opt) => opt.map(|r| r.to_string()).unwrap_or_default(),
            CellValue::Empty => String::new(),
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Key(k) => k.clone(),
            CellValue::Text(s) => s.clone(),
            CellValue::Change(ct) => ct.label().to_string(),
            CellValue::Mass(ms) => ms.to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Float(f, precision) => format!("{:.prec$}", f, prec = precision),
            CellValue::Row(opt) => opt.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string()),
            CellValue::Empty => "-".to_string(),
        };
        // Escape pipe characters for markdown tables
        raw.replace('|', "\\|")
    }

    /// Get the display width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Key(k) => k.len(),
            CellValue::Text(s) => s.len(),
            CellValue::Change(ct) => ct.label().len(),
            CellValue::Mass(ms) => ms.to_string().len(),
            CellValue::Number(n) => n.to_string().len(),
            CellValue::Float(f, precision) => format!("{:.prec$}", f, prec = precision).len(),
            CellValue::Row(opt) => opt.map_or(1, |r| r.to_string().len()),
            CellValue::Empty => 1,
        }
    }
}

/// Column definition with header label and width cap
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
#[derive(Default)]
pub struct TableRow {
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
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

    /// Output rows in the specified format
    pub fn output<I>(&self, rows: I, format: OutputFormat)
    where
        I: IntoIterator<Item = TableRow>,
    {
        let rows: Vec<TableRow> = rows.into_iter().collect();

        match format {
            OutputFormat::Csv => self.output_csv(&rows),
            OutputFormat::Md => self.output_md(&rows),
            _ => self.output_tsv(&rows),
        }
    }

    /// Calculate dynamic column widths based on actual content
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.columns
            .iter()
            .map(|col| {
                let header_len = col.header.len();
                let max_content = rows
                    .iter()
                    .filter_map(|r| r.get(col.key))
                    .map(|v| v.display_width())
                    .max()
                    .unwrap_or(0);

                // +2 truncation buffer; cap at the defined width but allow shrinking
                let natural_width = header_len.max(max_content.saturating_add(2));
                natural_width.min(col.width)
            })
            .collect()
    }

    fn output_tsv(&self, rows: &[TableRow]) {
        let widths = self.calculate_widths(rows);

        let header_parts: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| format!("{:<width$}", style(col.header).bold(), width = w))
            .collect();
        println!("{}", header_parts.join(" "));

        let total_width: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        println!("{}", "-".repeat(total_width));

        for row in rows {
            let row_parts: Vec<String> = self
                .columns
                .iter()
                .zip(&widths)
                .map(|(col, w)| match row.get(col.key) {
                    Some(value) => value.format_tsv(*w),
                    None => format!("{:<width$}", "-", width = w),
                })
                .collect();
            println!("{}", row_parts.join(" "));
        }

        if self.config.show_summary {
            println!();
            println!("{} {}(s) shown.", style(rows.len()).cyan(), self.entity_name);
        }
    }

    fn output_csv(&self, rows: &[TableRow]) {
        let headers: Vec<String> = self.columns.iter().map(|c| c.key.to_string()).collect();
        println!("{}", headers.join(","));

        for row in rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|col| {
                    row.get(col.key)
                        .map(|v| v.format_csv())
                        .unwrap_or_default()
                })
                .collect();
            println!("{}", values.join(","));
        }
    }

    fn output_md(&self, rows: &[TableRow]) {
        let headers: Vec<String> = self.columns.iter().map(|c| c.header.to_string()).collect();
        println!("| {} |", headers.join(" | "));

        let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
        println!("|{}|", separators.join("|"));

        for row in rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|col| {
                    row.get(col.key)
                        .map(|v| v.format_md())
                        .unwrap_or_else(|| "-".to_string())
                })
                .collect();
            println!("| {} |", values.join(" | "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_text_format() {
        let cell = CellValue::Text("Hello World".to_string());
        let tsv = cell.format_tsv(20);
        assert!(tsv.contains("Hello World"));

        let csv = cell.format_csv();
        assert_eq!(csv, "Hello World");

        let md = cell.format_md();
        assert_eq!(md, "Hello World");
    }

    #[test]
    fn test_cell_value_change_format() {
        let cell = CellValue::Change(ChangeType::SpringChanged);
        assert_eq!(cell.format_csv(), "spring-changed");
        assert_eq!(cell.format_md(), "Spring Changed");
    }

    #[test]
    fn test_cell_value_mass_format() {
        let cell = CellValue::Mass(MassStatus::Increased);
        assert_eq!(cell.format_csv(), "increased");
    }

    #[test]
    fn test_cell_value_row_format() {
        assert_eq!(CellValue::Row(Some(12)).format_csv(), "12");
        assert_eq!(CellValue::Row(None).format_csv(), "");
        assert_eq!(CellValue::Row(None).format_md(), "-");
    }

    #[test]
    fn test_cell_value_md_escapes_pipes() {
        let cell = CellValue::Text("a|b|c".to_string());
        assert_eq!(cell.format_md(), "a\\|b\\|c");
    }

    #[test]
    fn test_table_row_builder() {
        let row = TableRow::new()
            .cell("key", CellValue::Key("A7-1".to_string()))
            .cell("change", CellValue::Change(ChangeType::New));

        assert!(row.get("key").is_some());
        assert!(row.get("change").is_some());
        assert!(row.get("missing").is_none());
    }

    #[test]
    fn test_table_config_for_pipe() {
        let config = TableConfig::for_pipe();
        assert!(!config.show_summary);
    }
}
