//! `ptadiff motors` command - unique motor codes across PTA files

use console::style;
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::cli::{GlobalOpts, LoadOpts, OutputFormat};
use crate::core::workbook::load_table;
use crate::core::Config;

use super::{load_options, output_format};

#[derive(clap::Args, Debug)]
pub struct MotorsArgs {
    /// PTA file(s) to scan
    #[arg(value_name = "FILE", required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub load: LoadOpts,
}

pub fn run(args: MotorsArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let opts = load_options(&config, &args.load);

    let mut motors: BTreeSet<String> = BTreeSet::new();
    for file in &args.files {
        let table = load_table(file, &opts)?;
        motors.extend(table.motors());
    }

    match output_format(&config, global) {
        OutputFormat::Json => {
            let list: Vec<&String> = motors.iter().collect();
            println!("{}", serde_json::to_string_pretty(&list).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("moteur");
            for motor in &motors {
                println!("{}", crate::cli::helpers::escape_csv(motor));
            }
        }
        OutputFormat::Md => {
            for motor in &motors {
                println!("- {}", motor);
            }
        }
        _ => {
            if !global.quiet {
                println!(
                    "{} {} unique motor type(s)",
                    style("Found").bold(),
                    style(motors.len()).cyan()
                );
            }
            for motor in &motors {
                if global.quiet {
                    println!("{}", motor);
                } else {
                    println!("  • {}", motor);
                }
            }
        }
    }

    Ok(())
}
