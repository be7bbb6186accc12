//! `ptadiff diff` command - per-vehicle change table

use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::format_mass;
use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::{CompareOpts, GlobalOpts, OutputFormat};
use crate::core::diff::compare;
use crate::core::Config;
use crate::entities::{ChangeRecord, ChangeType};

use super::{diff_options, load_pair, output_format};

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("key", "KEY", 24),
    ColumnDef::new("change", "CHANGE", 16),
    ColumnDef::new("old_ref", "OLD REF", 20),
    ColumnDef::new("new_ref", "NEW REF", 20),
    ColumnDef::new("mass", "MASS", 11),
    ColumnDef::new("old_mass", "OLD KG", 10),
    ColumnDef::new("new_mass", "NEW KG", 10),
    ColumnDef::new("row_old", "OLD ROW", 8),
    ColumnDef::new("row_new", "NEW ROW", 8),
    ColumnDef::new("fields", "CHANGED FIELDS", 40),
];

#[derive(clap::Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub compare: CompareOpts,

    /// Only show rows that changed
    #[arg(long)]
    pub changed_only: bool,

    /// Only show rows with this change type
    #[arg(long, value_enum)]
    pub change_type: Option<ChangeType>,
}

pub fn run(args: DiffArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let (old, new) = load_pair(&args.compare, &config, global)?;
    let set = compare(&old, &new, &diff_options(&config, &args.compare));

    let records: Vec<&ChangeRecord> = set
        .records
        .iter()
        .filter(|r| !args.changed_only || r.is_change())
        .filter(|r| args.change_type.map_or(true, |ct| r.change_type == ct))
        .collect();

    let format = output_format(&config, global);
    if format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::to_string_pretty(&records).into_diagnostic()?
        );
        return Ok(());
    }

    let rows = records.iter().map(|r| to_row(r));

    let table_config = if global.quiet {
        TableConfig::for_pipe()
    } else {
        TableConfig::default()
    };
    TableFormatter::new(COLUMNS, "change")
        .with_config(table_config)
        .output(rows, format);

    Ok(())
}

fn to_row(record: &ChangeRecord) -> TableRow {
    let fields = record
        .field_changes
        .iter()
        .map(|f| format!("{}: {} -> {}", f.column, f.old, f.new))
        .collect::<Vec<_>>()
        .join("; ");

    TableRow::new()
        .cell("key", CellValue::Key(record.key.clone()))
        .cell("change", CellValue::Change(record.change_type))
        .cell(
            "old_ref",
            match &record.old_reference {
                Some(r) => CellValue::Text(r.clone()),
                None => CellValue::Empty,
            },
        )
        .cell(
            "new_ref",
            match &record.new_reference {
                Some(r) => CellValue::Text(r.clone()),
                None => CellValue::Empty,
            },
        )
        .cell("mass", CellValue::Mass(record.mass_status))
        .cell("old_mass", CellValue::Text(format_mass(record.old_mass)))
        .cell("new_mass", CellValue::Text(format_mass(record.new_mass)))
        .cell("row_old", CellValue::Row(record.row_old))
        .cell("row_new", CellValue::Row(record.row_new))
        .cell(
            "fields",
            if fields.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(fields)
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{FieldChange, MassStatus};

    #[test]
    fn test_to_row_joins_field_changes() {
        let record = ChangeRecord {
            key: "A1".to_string(),
            change_type: ChangeType::Modified,
            old_reference: Some("R-100".to_string()),
            new_reference: Some("R-100".to_string()),
            mass_status: MassStatus::Unchanged,
            old_mass: Some(1200.0),
            new_mass: Some(1200.0),
            row_old: Some(3),
            row_new: Some(4),
            field_changes: vec![FieldChange {
                column: "Moteur".to_string(),
                old: "DV5".to_string(),
                new: "EB2".to_string(),
            }],
        };

        let row = to_row(&record);
        match row.get("fields") {
            Some(CellValue::Text(s)) => assert_eq!(s, "Moteur: DV5 -> EB2"),
            other => panic!("unexpected cell: {:?}", other),
        }
        match row.get("row_new") {
            Some(CellValue::Row(Some(4))) => {}
            other => panic!("unexpected cell: {:?}", other),
        }
    }
}
