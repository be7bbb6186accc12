//! Spring record and loaded PTA table types

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::core::schema::ColumnMap;

/// One data row of a PTA sheet
///
/// Records are immutable once loaded. `row` is the 1-based sheet row the
/// record came from (header is row 1, units row 2, data starts at row 3),
/// which is what the Excel exporter uses to point back at the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpringRecord {
    /// 1-based sheet row number in the source file
    pub row: u32,

    /// Matching key (trimmed display value of the key column)
    pub key: String,

    /// Spring reference fitted to this vehicle configuration
    pub reference: String,

    /// Reference suspended mass in kg, when parseable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,

    /// Engine code, when the sheet carries a Moteur column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motor: Option<String>,

    /// Full display row, aligned with the table headers
    pub fields: Vec<String>,
}

impl SpringRecord {
    /// Field value by column index, empty string when the row is short
    pub fn field(&self, idx: usize) -> &str {
        self.fields.get(idx).map(String::as_str).unwrap_or("")
    }
}

/// A fully loaded and validated PTA table
#[derive(Debug, Clone, Serialize)]
pub struct PtaTable {
    /// Source file the table was read from
    pub path: PathBuf,

    /// Sheet the table came from ("csv" for CSV inputs)
    pub sheet: String,

    /// Header row, trimmed
    pub headers: Vec<String>,

    /// Resolved positions of the key/required/optional columns
    pub columns: ColumnMap,

    /// Data rows in sheet order
    pub records: Vec<SpringRecord>,

    /// Rows dropped because the key cell was blank
    pub skipped_blank_keys: usize,

    /// Keys that appeared more than once (first occurrence kept)
    pub duplicate_keys: Vec<String>,
}

impl PtaTable {
    /// Look up a record by key
    pub fn get(&self, key: &str) -> Option<&SpringRecord> {
        self.records.iter().find(|r| r.key == key)
    }

    /// Sorted unique motor codes present in the table
    pub fn motors(&self) -> BTreeSet<String> {
        self.records
            .iter()
            .filter_map(|r| r.motor.as_deref())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// File name for display purposes
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::ColumnMap;

    fn record(row: u32, key: &str, reference: &str, motor: Option<&str>) -> SpringRecord {
        SpringRecord {
            row,
            key: key.to_string(),
            reference: reference.to_string(),
            mass: Some(1200.0),
            motor: motor.map(str::to_string),
            fields: vec![key.to_string(), reference.to_string()],
        }
    }

    fn table(records: Vec<SpringRecord>) -> PtaTable {
        PtaTable {
            path: PathBuf::from("old.xlsx"),
            sheet: "PTA".to_string(),
            headers: vec!["Version".to_string(), "Référence".to_string()],
            columns: ColumnMap {
                key: 0,
                reference: 1,
                mass: 2,
                motor: None,
            },
            records,
            skipped_blank_keys: 0,
            duplicate_keys: Vec::new(),
        }
    }

    #[test]
    fn test_get_by_key() {
        let t = table(vec![record(3, "K1", "R-100", None), record(4, "K2", "R-200", None)]);
        assert_eq!(t.get("K2").unwrap().reference, "R-200");
        assert!(t.get("K9").is_none());
    }

    #[test]
    fn test_motors_sorted_unique() {
        let t = table(vec![
            record(3, "K1", "R-100", Some("DV5")),
            record(4, "K2", "R-200", Some("EB2")),
            record(5, "K3", "R-300", Some("DV5")),
            record(6, "K4", "R-400", None),
        ]);
        let motors: Vec<String> = t.motors().into_iter().collect();
        assert_eq!(motors, vec!["DV5".to_string(), "EB2".to_string()]);
    }

    #[test]
    fn test_field_out_of_range_is_empty() {
        let r = record(3, "K1", "R-100", None);
        assert_eq!(r.field(0), "K1");
        assert_eq!(r.field(7), "");
    }
}
