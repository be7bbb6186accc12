//! Excel report writer
//!
//! Re-emits the new PTA table with the legacy highlighting (new rows in
//! red with white text, spring-changed rows in the pale blue fill), and
//! adds Summary, Changes, and Motors sheets.

use miette::Diagnostic;
use rust_xlsxwriter::{Color, Format, Workbook, XlsxError};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::diff::ChangeSet;
use crate::core::workbook::parse_decimal;
use crate::entities::{ChangeType, PtaTable};

/// Fill colors carried over from the legacy exporter
const HEADER_BG: u32 = 0x003366;
const NEW_BG: u32 = 0xFF5733;
const SPRING_CHANGED_BG: u32 = 0xB4C6E7;
const MODIFIED_BG: u32 = 0xFFE699;

/// Errors raised while writing the report workbook
#[derive(Debug, Error, Diagnostic)]
pub enum ReportError {
    #[error("refusing to overwrite {path:?}")]
    #[diagnostic(
        code(ptadiff::report::exists),
        help("pass --force to overwrite the existing report")
    )]
    AlreadyExists { path: PathBuf },

    #[error("failed to write report {path:?}")]
    #[diagnostic(code(ptadiff::report::write))]
    Write {
        path: PathBuf,
        #[source]
        source: XlsxError,
    },
}

/// Write the full report workbook for a comparison run
///
/// `new_table` must be the table the change set was computed against; its
/// rows are matched to change records by key.
pub fn write_report(
    set: &ChangeSet,
    new_table: &PtaTable,
    path: &Path,
) -> Result<(), ReportError> {
    let wrap = |source: XlsxError| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = Workbook::new();

    let header_fmt = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_BG));
    let new_fmt = Format::new()
        .set_background_color(Color::RGB(NEW_BG))
        .set_font_color(Color::White);
    let spring_fmt = Format::new().set_background_color(Color::RGB(SPRING_CHANGED_BG));
    let modified_fmt = Format::new().set_background_color(Color::RGB(MODIFIED_BG));
    let label_fmt = Format::new().set_bold();

    write_pta_sheet(
        &mut workbook,
        set,
        new_table,
        &header_fmt,
        &new_fmt,
        &spring_fmt,
        &modified_fmt,
    )
    .map_err(wrap)?;
    write_summary_sheet(&mut workbook, set, &label_fmt).map_err(wrap)?;
    write_changes_sheet(&mut workbook, set, &header_fmt).map_err(wrap)?;
    write_motors_sheet(&mut workbook, set, &header_fmt).map_err(wrap)?;

    workbook.save(path).map_err(wrap)?;
    Ok(())
}

fn write_pta_sheet(
    workbook: &mut Workbook,
    set: &ChangeSet,
    new_table: &PtaTable,
    header_fmt: &Format,
    new_fmt: &Format,
    spring_fmt: &Format,
    modified_fmt: &Format,
) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(new_table.sheet.as_str())?;
    sheet.set_freeze_panes(1, 0)?;

    for (col, header) in new_table.headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, header, header_fmt)?;
        sheet.set_column_width(col as u16, 18)?;
    }

    for (row_idx, record) in new_table.records.iter().enumerate() {
        let row = (row_idx + 1) as u32;
        let fmt = set
            .records
            .iter()
            .find(|c| c.key == record.key)
            .and_then(|c| match c.change_type {
                ChangeType::New => Some(new_fmt),
                ChangeType::SpringChanged => Some(spring_fmt),
                ChangeType::Modified => Some(modified_fmt),
                _ => None,
            });

        for (col, value) in record.fields.iter().enumerate() {
            let col = col as u16;
            match (parse_decimal(value), fmt) {
                (Some(n), Some(fmt)) => {
                    sheet.write_number_with_format(row, col, n, fmt)?;
                }
                (Some(n), None) if !looks_textual(value) => {
                    sheet.write_number(row, col, n)?;
                }
                (_, Some(fmt)) => {
                    sheet.write_string_with_format(row, col, value, fmt)?;
                }
                (_, None) => {
                    sheet.write_string(row, col, value)?;
                }
            }
        }
    }

    Ok(())
}

// Keys like "1200" parse as numbers; keep pure numerics numeric but leave
// anything with letters alone.
fn looks_textual(value: &str) -> bool {
    value.chars().any(|c| c.is_alphabetic())
}

fn write_summary_sheet(
    workbook: &mut Workbook,
    set: &ChangeSet,
    label_fmt: &Format,
) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("Summary")?;
    sheet.set_column_width(0, 32)?;
    sheet.set_column_width(1, 40)?;

    let s = &set.summary;
    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();

    fn pair(
        sheet: &mut rust_xlsxwriter::Worksheet,
        row: &mut u32,
        label: &str,
        value: String,
        label_fmt: &Format,
    ) -> Result<(), XlsxError> {
        sheet.write_string_with_format(*row, 0, label, label_fmt)?;
        sheet.write_string(*row, 1, value)?;
        *row += 1;
        Ok(())
    }

    let mut row = 0u32;
    pair(sheet, &mut row, "Generated", generated, label_fmt)?;
    pair(sheet, &mut row, "PTA type", set.pta_type.to_string(), label_fmt)?;
    pair(sheet, &mut row, "Old file", set.old_file.clone(), label_fmt)?;
    pair(sheet, &mut row, "New file", set.new_file.clone(), label_fmt)?;
    row += 1;
    pair(sheet, &mut row, "Cars in old file", s.old_total.to_string(), label_fmt)?;
    pair(sheet, &mut row, "Cars in new file", s.new_total.to_string(), label_fmt)?;
    pair(sheet, &mut row, "New cars", s.new.to_string(), label_fmt)?;
    pair(sheet, &mut row, "Removed cars", s.removed.to_string(), label_fmt)?;
    pair(
        sheet,
        &mut row,
        "Spring changed cars",
        s.spring_changed.to_string(),
        label_fmt,
    )?;
    pair(sheet, &mut row, "Modified cars", s.modified.to_string(), label_fmt)?;
    pair(sheet, &mut row, "Unchanged cars", s.unchanged.to_string(), label_fmt)?;
    pair(
        sheet,
        &mut row,
        "Spring change rate",
        format!("{:.1} %", s.spring_change_rate),
        label_fmt,
    )?;
    pair(
        sheet,
        &mut row,
        "Mass increased / decreased",
        format!("{} / {}", s.mass_increased, s.mass_decreased),
        label_fmt,
    )?;

    let (old_blank, new_blank) = s.skipped_blank_keys;
    let (old_dup, new_dup) = s.duplicate_keys;
    if old_blank + new_blank + old_dup + new_dup > 0 {
        row += 1;
        pair(
            sheet,
            &mut row,
            "Rows skipped (blank key)",
            format!("old {} / new {}", old_blank, new_blank),
            label_fmt,
        )?;
        pair(
            sheet,
            &mut row,
            "Duplicate keys dropped",
            format!("old {} / new {}", old_dup, new_dup),
            label_fmt,
        )?;
    }

    Ok(())
}

fn write_changes_sheet(
    workbook: &mut Workbook,
    set: &ChangeSet,
    header_fmt: &Format,
) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("Changes")?;
    sheet.set_freeze_panes(1, 0)?;

    let headers = [
        "Key",
        "Change Type",
        "Old Reference",
        "New Reference",
        "Mass Status",
        "Old Mass",
        "New Mass",
        "Row Old",
        "Row New",
        "Field Changes",
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, header_fmt)?;
        sheet.set_column_width(col as u16, 16)?;
    }
    sheet.set_column_width(9, 48)?;

    let mut row = 1u32;
    for change in set.changes() {
        sheet.write_string(row, 0, &change.key)?;
        sheet.write_string(row, 1, change.change_type.label())?;
        sheet.write_string(row, 2, change.old_reference.as_deref().unwrap_or("-"))?;
        sheet.write_string(row, 3, change.new_reference.as_deref().unwrap_or("-"))?;
        sheet.write_string(row, 4, change.mass_status.to_string())?;
        if let Some(mass) = change.old_mass {
            sheet.write_number(row, 5, mass)?;
        }
        if let Some(mass) = change.new_mass {
            sheet.write_number(row, 6, mass)?;
        }
        if let Some(r) = change.row_old {
            sheet.write_number(row, 7, r as f64)?;
        }
        if let Some(r) = change.row_new {
            sheet.write_number(row, 8, r as f64)?;
        }
        if !change.field_changes.is_empty() {
            let detail = change
                .field_changes
                .iter()
                .map(|f| format!("{}: {} -> {}", f.column, f.old, f.new))
                .collect::<Vec<_>>()
                .join("; ");
            sheet.write_string(row, 9, detail)?;
        }
        row += 1;
    }

    Ok(())
}

fn write_motors_sheet(
    workbook: &mut Workbook,
    set: &ChangeSet,
    header_fmt: &Format,
) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("Motors")?;
    sheet.set_column_width(0, 24)?;
    sheet.write_string_with_format(0, 0, "Moteur", header_fmt)?;

    for (i, motor) in set.summary.motors.iter().enumerate() {
        sheet.write_string((i + 1) as u32, 0, motor)?;
    }

    Ok(())
}
