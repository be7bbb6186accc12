//! `ptadiff export` command - write the annotated Excel report

use console::style;
use dialoguer::Confirm;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::{CompareOpts, GlobalOpts};
use crate::core::diff::compare;
use crate::core::Config;
use crate::report::excel::{write_report, ReportError};

use super::{diff_options, load_pair};

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub compare: CompareOpts,

    /// Path of the report workbook to write
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: PathBuf,

    /// Overwrite the output file if it exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();

    if args.output.exists() && !args.force {
        let overwrite = console::user_attended()
            && Confirm::new()
                .with_prompt(format!("Overwrite {}?", args.output.display()))
                .default(false)
                .interact()
                .into_diagnostic()?;
        if !overwrite {
            return Err(ReportError::AlreadyExists { path: args.output }.into());
        }
    }

    let (old, new) = load_pair(&args.compare, &config, global)?;
    let set = compare(&old, &new, &diff_options(&config, &args.compare));

    write_report(&set, &new, &args.output)?;

    if !global.quiet {
        let s = &set.summary;
        println!(
            "{} Report written to {}",
            style("✓").green(),
            args.output.display()
        );
        println!(
            "  {} new, {} removed, {} spring changed, {} modified, {} unchanged",
            style(s.new).red(),
            style(s.removed).magenta(),
            style(s.spring_changed).yellow(),
            style(s.modified).blue(),
            style(s.unchanged).dim()
        );
    }

    Ok(())
}
