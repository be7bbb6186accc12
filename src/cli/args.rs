//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    analyze::AnalyzeArgs,
    completions::CompletionsArgs,
    diff::DiffArgs,
    export::ExportArgs,
    inspect::InspectArgs,
    motors::MotorsArgs,
};
use crate::core::schema::PtaType;

#[derive(Parser)]
#[command(name = "ptadiff")]
#[command(author, version, about = "PTA Change Toolkit")]
#[command(long_about = "A toolkit for detecting spring specification changes between two releases of a PTA vehicle workbook.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Options shared by every command that loads a PTA file
#[derive(clap::Args, Clone, Debug)]
pub struct LoadOpts {
    /// Sheet holding the spring table
    #[arg(long, env = "PTADIFF_SHEET")]
    pub sheet: Option<String>,

    /// Header of the matching key column (default: first column)
    #[arg(long, env = "PTADIFF_KEY_COLUMN")]
    pub key: Option<String>,
}

/// Options shared by every command that compares two PTA files
#[derive(clap::Args, Clone, Debug)]
pub struct CompareOpts {
    /// Old PTA file
    #[arg(long, value_name = "FILE")]
    pub old: PathBuf,

    /// New PTA file
    #[arg(long, value_name = "FILE")]
    pub new: PathBuf,

    #[command(flatten)]
    pub load: LoadOpts,

    /// Absolute mass tolerance in kg
    #[arg(long, value_name = "KG")]
    pub mass_tolerance: Option<f64>,

    /// PTA type the files describe
    #[arg(long, value_enum)]
    pub pta_type: Option<PtaType>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a single PTA file and summarize it
    Inspect(InspectArgs),

    /// Compare two PTA files and show the statistics dashboard
    Analyze(AnalyzeArgs),

    /// Compare two PTA files and list the per-vehicle changes
    Diff(DiffArgs),

    /// Compare two PTA files and export the annotated Excel report
    Export(ExportArgs),

    /// List the unique motor codes across one or more PTA files
    Motors(MotorsArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (tsv for tables)
    #[default]
    Auto,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
}
