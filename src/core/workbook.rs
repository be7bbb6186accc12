//! PTA workbook loading and validation
//!
//! Reads the spring table out of an Excel workbook (.xlsx/.xlsm/.xls via
//! calamine) or a CSV export with the same layout: header row, units row,
//! then data. Validation order follows the legacy uploader: existence,
//! extension, size, sheet, emptiness, required columns.

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use miette::Diagnostic;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::schema::{self, ColumnMap};
use crate::entities::{PtaTable, SpringRecord};

/// Accepted input extensions, lowercased
pub const ALLOWED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "csv"];

/// Errors raised while opening and validating a PTA file
#[derive(Debug, Error, Diagnostic)]
pub enum WorkbookError {
    #[error("file {path:?} does not exist")]
    #[diagnostic(code(ptadiff::workbook::not_found))]
    NotFound { path: PathBuf },

    #[error("unsupported file format {ext:?} for {path:?}")]
    #[diagnostic(
        code(ptadiff::workbook::unsupported_extension),
        help("PTA files are Excel workbooks (.xlsx, .xlsm, .xls) or CSV exports (.csv)")
    )]
    UnsupportedExtension { path: PathBuf, ext: String },

    #[error("{path:?} is {size_mb} MB, above the {limit_mb} MB limit")]
    #[diagnostic(
        code(ptadiff::workbook::too_large),
        help("raise max_file_size_mb in the ptadiff config if releases really are this big")
    )]
    TooLarge {
        path: PathBuf,
        size_mb: u64,
        limit_mb: u64,
    },

    #[error("sheet {sheet:?} not found in {path:?} (available: {available})")]
    #[diagnostic(
        code(ptadiff::workbook::sheet_missing),
        help("pass --sheet to select the sheet holding the spring table")
    )]
    SheetMissing {
        path: PathBuf,
        sheet: String,
        available: String,
    },

    #[error("no data rows in sheet {sheet:?} of {path:?}")]
    #[diagnostic(code(ptadiff::workbook::empty))]
    Empty { path: PathBuf, sheet: String },

    #[error("missing columns in {path:?}: {missing}")]
    #[diagnostic(
        code(ptadiff::workbook::missing_columns),
        help("the header row must carry the Référence and suspended mass columns; check that the file is a PTA export")
    )]
    MissingColumns { path: PathBuf, missing: String },

    #[error("failed to read spreadsheet {path:?}")]
    #[diagnostic(code(ptadiff::workbook::spreadsheet))]
    Spreadsheet {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("failed to read CSV {path:?}")]
    #[diagnostic(code(ptadiff::workbook::csv))]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("IO error reading {path:?}")]
    #[diagnostic(code(ptadiff::workbook::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Options controlling how a PTA file is read
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Sheet holding the spring table (ignored for CSV inputs)
    pub sheet: String,
    /// Header of the matching key column; None selects the first column
    pub key_column: Option<String>,
    /// Size limit in MB
    pub max_file_size_mb: u64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            sheet: schema::DEFAULT_SHEET.to_string(),
            key_column: None,
            max_file_size_mb: 200,
        }
    }
}

/// Parse a decimal that may use a French comma separator
///
/// Thousands separators (space, narrow no-break space) are tolerated.
pub fn parse_decimal(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{202f}' && *c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Load and validate a PTA table from a workbook or CSV file
pub fn load_table(path: &Path, opts: &LoadOptions) -> Result<PtaTable, WorkbookError> {
    if !path.exists() {
        return Err(WorkbookError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(WorkbookError::UnsupportedExtension {
            path: path.to_path_buf(),
            ext,
        });
    }

    let meta = std::fs::metadata(path).map_err(|source| WorkbookError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let size_mb = meta.len() / (1024 * 1024);
    if size_mb > opts.max_file_size_mb {
        return Err(WorkbookError::TooLarge {
            path: path.to_path_buf(),
            size_mb,
            limit_mb: opts.max_file_size_mb,
        });
    }

    let (sheet, rows) = if ext == "csv" {
        ("csv".to_string(), read_csv_rows(path)?)
    } else {
        (opts.sheet.clone(), read_sheet_rows(path, &opts.sheet)?)
    };

    build_table(path, sheet, rows, opts)
}

/// List the sheet names of a workbook (single "csv" entry for CSV files)
pub fn sheet_names(path: &Path) -> Result<Vec<String>, WorkbookError> {
    if !path.exists() {
        return Err(WorkbookError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if ext == "csv" {
        return Ok(vec!["csv".to_string()]);
    }
    let workbook = open_workbook_auto(path).map_err(|source| WorkbookError::Spreadsheet {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(workbook.sheet_names().to_vec())
}

fn read_sheet_rows(path: &Path, sheet: &str) -> Result<Vec<Vec<String>>, WorkbookError> {
    let mut workbook = open_workbook_auto(path).map_err(|source| WorkbookError::Spreadsheet {
        path: path.to_path_buf(),
        source,
    })?;

    let names = workbook.sheet_names().to_vec();
    if !names.iter().any(|n| n == sheet) {
        return Err(WorkbookError::SheetMissing {
            path: path.to_path_buf(),
            sheet: sheet.to_string(),
            available: names.join(", "),
        });
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|source| WorkbookError::Spreadsheet {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect())
}

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<String>>, WorkbookError> {
    let file = File::open(path).map_err(|source| WorkbookError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|source| WorkbookError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        rows.push(record.iter().map(|s| s.trim().to_string()).collect());
    }
    Ok(rows)
}

/// Display text of a spreadsheet cell
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#{:?}", e),
    }
}

fn build_table(
    path: &Path,
    sheet: String,
    rows: Vec<Vec<String>>,
    opts: &LoadOptions,
) -> Result<PtaTable, WorkbookError> {
    let mut iter = rows.into_iter();
    let headers: Vec<String> = iter.next().unwrap_or_default();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(WorkbookError::Empty {
            path: path.to_path_buf(),
            sheet,
        });
    }

    let columns = ColumnMap::resolve(&headers, opts.key_column.as_deref()).map_err(|missing| {
        WorkbookError::MissingColumns {
            path: path.to_path_buf(),
            missing: missing.join(", "),
        }
    })?;

    let mut records: Vec<SpringRecord> = Vec::new();
    let mut skipped_blank_keys = 0;
    let mut duplicate_keys = Vec::new();
    let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();

    for (idx, fields) in iter.enumerate() {
        // Sheet rows are 1-based and the header sits on row 1
        let row = (idx + 2) as u32;
        if idx == schema::UNITS_ROW - 1 {
            // Units row between header and data
            continue;
        }
        if fields.iter().all(|f| f.is_empty()) {
            continue;
        }

        let key = fields
            .get(columns.key)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        if key.is_empty() {
            skipped_blank_keys += 1;
            continue;
        }
        if !seen.insert(key.clone()) {
            duplicate_keys.push(key);
            continue;
        }

        let reference = fields
            .get(columns.reference)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        let mass = fields.get(columns.mass).and_then(|s| parse_decimal(s));
        let motor = columns
            .motor
            .and_then(|c| fields.get(c))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        records.push(SpringRecord {
            row,
            key,
            reference,
            mass,
            motor,
            fields,
        });
    }

    if records.is_empty() {
        return Err(WorkbookError::Empty {
            path: path.to_path_buf(),
            sheet,
        });
    }

    Ok(PtaTable {
        path: path.to_path_buf(),
        sheet,
        headers,
        columns,
        records,
        skipped_blank_keys,
        duplicate_keys,
    })
}
