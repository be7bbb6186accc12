//! Command implementations

pub mod analyze;
pub mod completions;
pub mod diff;
pub mod export;
pub mod inspect;
pub mod motors;

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::cli::{CompareOpts, GlobalOpts, LoadOpts, OutputFormat};
use crate::core::diff::DiffOptions;
use crate::core::workbook::{load_table, LoadOptions};
use crate::core::Config;
use crate::entities::PtaTable;

/// Output format to use: an explicit `-f` wins over the configured default
pub(crate) fn output_format(config: &Config, global: &GlobalOpts) -> OutputFormat {
    if global.format != OutputFormat::Auto {
        return global.format;
    }
    match config.default_format.as_deref() {
        Some("json") => OutputFormat::Json,
        Some("csv") => OutputFormat::Csv,
        Some("md") => OutputFormat::Md,
        Some("tsv") => OutputFormat::Tsv,
        _ => OutputFormat::Auto,
    }
}

/// Build load options from the config plus CLI overrides
pub(crate) fn load_options(config: &Config, load: &LoadOpts) -> LoadOptions {
    LoadOptions {
        sheet: load
            .sheet
            .clone()
            .unwrap_or_else(|| config.sheet().to_string()),
        key_column: load.key.clone().or_else(|| config.key_column.clone()),
        max_file_size_mb: config.max_file_size_mb(),
    }
}

/// Build diff options from the config plus CLI overrides
pub(crate) fn diff_options(config: &Config, compare: &CompareOpts) -> DiffOptions {
    DiffOptions {
        mass_tolerance: compare.mass_tolerance.unwrap_or(config.mass_tolerance()),
        pta_type: compare.pta_type.unwrap_or(config.pta_type()),
    }
}

/// Load both sides of a comparison, surfacing data quality warnings
pub(crate) fn load_pair(
    compare: &CompareOpts,
    config: &Config,
    global: &GlobalOpts,
) -> Result<(PtaTable, PtaTable)> {
    let opts = load_options(config, &compare.load);

    let old = load_table(&compare.old, &opts)?;
    let new = load_table(&compare.new, &opts)?;

    if !global.quiet {
        for table in [&old, &new] {
            warn_table(table);
        }
    }
    if global.verbose {
        eprintln!(
            "{} {}: {} rows, {}: {} rows",
            style("→").blue(),
            old.file_name(),
            old.records.len(),
            new.file_name(),
            new.records.len()
        );
    }

    Ok((old, new))
}

fn warn_table(table: &PtaTable) {
    if table.skipped_blank_keys > 0 {
        eprintln!(
            "{} {}: skipped {} row(s) with a blank key",
            style("⚠").yellow(),
            table.file_name(),
            table.skipped_blank_keys
        );
    }
    if !table.duplicate_keys.is_empty() {
        eprintln!(
            "{} {}: dropped {} duplicate key(s) (first occurrence kept): {}",
            style("⚠").yellow(),
            table.file_name(),
            table.duplicate_keys.len(),
            crate::cli::helpers::truncate_str(&table.duplicate_keys.join(", "), 60)
        );
    }
}

/// Write a report to a file, or stdout when no path is given
pub(crate) fn write_output(content: &str, output_path: Option<PathBuf>) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
