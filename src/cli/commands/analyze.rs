//! `ptadiff analyze` command - comparison statistics dashboard

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::{CompareOpts, GlobalOpts, OutputFormat};
use crate::core::diff::{compare, ChangeSet};
use crate::core::Config;

use super::{diff_options, load_pair, output_format, write_output};

#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub compare: CompareOpts,

    /// Write a Markdown report to a file instead of the dashboard
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: AnalyzeArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let (old, new) = load_pair(&args.compare, &config, global)?;
    let set = compare(&old, &new, &diff_options(&config, &args.compare));

    if args.output.is_some() {
        let report = markdown_report(&set);
        return write_output(&report, args.output);
    }

    if output_format(&config, global) == OutputFormat::Json {
        let out = serde_json::json!({
            "pta_type": set.pta_type,
            "old_file": set.old_file,
            "new_file": set.new_file,
            "summary": set.summary,
        });
        println!("{}", serde_json::to_string_pretty(&out).into_diagnostic()?);
        return Ok(());
    }

    print_dashboard(&set);
    Ok(())
}

fn print_dashboard(set: &ChangeSet) {
    let s = &set.summary;
    let width = 60;

    println!("{}", style("PTA Change Analysis").bold().underlined());
    println!("{}", "═".repeat(width));
    println!(
        "{} ({}) → {} ({})   type {}",
        set.old_file,
        s.old_total,
        set.new_file,
        s.new_total,
        style(set.pta_type).cyan()
    );
    println!();

    println!("{}", style("CHANGE DISTRIBUTION").bold());
    print_count("New cars", s.new, style("■").red());
    print_count("Removed cars", s.removed, style("■").magenta());
    print_count("Spring changed cars", s.spring_changed, style("■").yellow());
    print_count("Modified cars", s.modified, style("■").blue());
    print_count("Unchanged cars", s.unchanged, style("■").dim());
    println!();

    println!("{}", style("MASS").bold());
    println!("  Increased: {:<6} Decreased: {}", s.mass_increased, s.mass_decreased);
    println!();

    if !s.motors.is_empty() {
        println!(
            "{} ({} unique)",
            style("MOTORS").bold(),
            s.motors.len()
        );
        println!("  {}", s.motors.join(", "));
        println!();
    }

    println!("{}", "═".repeat(width));
    let rate = format!("{:.1} %", s.spring_change_rate);
    let rate_styled = if s.spring_changed == 0 {
        style(rate).green()
    } else {
        style(rate).yellow().bold()
    };
    println!("Spring change rate: {}", rate_styled);
}

fn print_count(label: &str, count: usize, marker: console::StyledObject<&str>) {
    println!("  {} {:<22} {}", marker, label, style(count).cyan());
}

fn markdown_report(set: &ChangeSet) -> String {
    let s = &set.summary;
    let mut output = String::new();

    output.push_str("# PTA Change Analysis\n\n");
    output.push_str(&format!(
        "Comparing `{}` against `{}` (PTA type {}).\n\n",
        set.old_file, set.new_file, set.pta_type
    ));

    output.push_str("## Summary\n\n");
    let mut summary = Builder::default();
    summary.push_record(["Metric", "Count"]);
    summary.push_record(["Cars in old file", &s.old_total.to_string()]);
    summary.push_record(["Cars in new file", &s.new_total.to_string()]);
    summary.push_record(["New cars", &s.new.to_string()]);
    summary.push_record(["Removed cars", &s.removed.to_string()]);
    summary.push_record(["Spring changed cars", &s.spring_changed.to_string()]);
    summary.push_record(["Modified cars", &s.modified.to_string()]);
    summary.push_record(["Unchanged cars", &s.unchanged.to_string()]);
    summary.push_record([
        "Spring change rate",
        &format!("{:.1} %", s.spring_change_rate),
    ]);
    output.push_str(&summary.build().with(Style::markdown()).to_string());
    output.push('\n');

    let changes: Vec<_> = set.changes().collect();
    if !changes.is_empty() {
        output.push_str("\n## Changes\n\n");
        let mut table = Builder::default();
        table.push_record(["Key", "Change", "Old Reference", "New Reference", "Mass"]);
        for c in &changes {
            table.push_record([
                c.key.as_str(),
                c.change_type.label(),
                c.old_reference.as_deref().unwrap_or("-"),
                c.new_reference.as_deref().unwrap_or("-"),
                &c.mass_status.to_string(),
            ]);
        }
        output.push_str(&table.build().with(Style::markdown()).to_string());
        output.push('\n');
    }

    if !s.motors.is_empty() {
        output.push_str("\n## Motors\n\n");
        for motor in &s.motors {
            output.push_str(&format!("- {}\n", motor));
        }
    }

    output
}
