//! Core module - configuration, sheet layout, loading, and comparison

pub mod config;
pub mod diff;
pub mod schema;
pub mod workbook;

pub use config::Config;
pub use diff::{compare, ChangeSet, ChangeSummary, DiffOptions};
pub use schema::{ColumnMap, PtaType};
pub use workbook::{load_table, LoadOptions, WorkbookError};
