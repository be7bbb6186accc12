//! `ptadiff inspect` command - validate and summarize one PTA file

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::{GlobalOpts, LoadOpts, OutputFormat};
use crate::core::workbook::{load_table, sheet_names};
use crate::core::Config;

use super::{load_options, output_format};

#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    /// PTA file to inspect
    pub file: PathBuf,

    #[command(flatten)]
    pub load: LoadOpts,
}

pub fn run(args: InspectArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let opts = load_options(&config, &args.load);

    let sheets = sheet_names(&args.file)?;
    let table = load_table(&args.file, &opts)?;

    let size_mb = std::fs::metadata(&args.file)
        .map(|m| m.len() as f64 / (1024.0 * 1024.0))
        .unwrap_or(0.0);

    let masses: Vec<f64> = table.records.iter().filter_map(|r| r.mass).collect();
    let mass_min = masses.iter().cloned().fold(f64::INFINITY, f64::min);
    let mass_max = masses.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mass_mean = if masses.is_empty() {
        0.0
    } else {
        masses.iter().sum::<f64>() / masses.len() as f64
    };

    if output_format(&config, global) == OutputFormat::Json {
        let info = serde_json::json!({
            "file": table.path,
            "size_mb": size_mb,
            "sheets": sheets,
            "sheet": table.sheet,
            "rows": table.records.len(),
            "headers": table.headers,
            "key_column": table.headers.get(table.columns.key),
            "reference_column": table.columns.reference,
            "mass_column": table.columns.mass,
            "motor_column": table.columns.motor.is_some(),
            "motors": table.motors().into_iter().collect::<Vec<_>>(),
            "mass": if masses.is_empty() {
                serde_json::Value::Null
            } else {
                serde_json::json!({ "min": mass_min, "mean": mass_mean, "max": mass_max })
            },
            "skipped_blank_keys": table.skipped_blank_keys,
            "duplicate_keys": table.duplicate_keys,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&info).into_diagnostic()?
        );
        return Ok(());
    }

    println!(
        "{} {}",
        style("PTA file").bold().underlined(),
        table.path.display()
    );
    println!();
    println!("  Size:        {:.1} MB", size_mb);
    println!("  Sheets:      {}", sheets.join(", "));
    println!("  Sheet used:  {}", table.sheet);
    println!("  Data rows:   {}", style(table.records.len()).cyan());
    println!("  Columns:     {}", table.headers.len());
    println!(
        "  Key column:  {}",
        table
            .headers
            .get(table.columns.key)
            .map(String::as_str)
            .unwrap_or("-")
    );
    println!(
        "  Reference:   column {} / Mass: column {}",
        table.columns.reference + 1,
        table.columns.mass + 1
    );
    println!(
        "  Motors:      {}",
        if table.columns.motor.is_some() {
            table.motors().len().to_string()
        } else {
            "no Moteur column".to_string()
        }
    );
    if !masses.is_empty() {
        println!(
            "  Mass (kg):   min {:.1} / mean {:.1} / max {:.1}",
            mass_min, mass_mean, mass_max
        );
    }

    if !global.quiet {
        if table.skipped_blank_keys > 0 {
            println!(
                "  {} {} row(s) skipped for a blank key",
                style("⚠").yellow(),
                table.skipped_blank_keys
            );
        }
        if !table.duplicate_keys.is_empty() {
            println!(
                "  {} {} duplicate key(s) dropped",
                style("⚠").yellow(),
                table.duplicate_keys.len()
            );
        }
    }

    println!();
    println!("{} File is a valid PTA table.", style("✓").green());

    Ok(())
}
