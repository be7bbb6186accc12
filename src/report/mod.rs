//! Report generation - the exported Excel workbook

pub mod excel;

pub use excel::{write_report, ReportError};
