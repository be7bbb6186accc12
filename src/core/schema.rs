//! PTA sheet layout - sheet name, header resolution, PTA type

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sheet the spring table lives on, unless overridden
pub const DEFAULT_SHEET: &str = "PTA";

/// 0-based index of the units row that sits between the header and the data
pub const UNITS_ROW: usize = 1;

/// Canonical header of the spring reference column
pub const REFERENCE_COLUMN: &str = "Référence";

/// Canonical header of the reference suspended mass column
pub const MASS_COLUMN: &str = "Masse suspendue en charge de référence";

/// Canonical header of the optional engine code column
pub const MOTOR_COLUMN: &str = "Moteur";

/// Vehicle family the PTA file describes
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PtaType {
    /// Véhicules Particuliers (passenger cars)
    #[default]
    Vp,
    /// Véhicules Utilitaires (utility vehicles)
    Vu,
}

impl std::fmt::Display for PtaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PtaType::Vp => write!(f, "VP"),
            PtaType::Vu => write!(f, "VU"),
        }
    }
}

impl std::str::FromStr for PtaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vp" => Ok(PtaType::Vp),
            "vu" => Ok(PtaType::Vu),
            _ => Err(format!("Invalid PTA type: {}. Use 'vp' or 'vu'", s)),
        }
    }
}

/// Resolved column positions of a loaded PTA table
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ColumnMap {
    /// Matching key column
    pub key: usize,
    /// Spring reference column
    pub reference: usize,
    /// Reference suspended mass column
    pub mass: usize,
    /// Engine code column, when present
    pub motor: Option<usize>,
}

/// Normalize a header for matching: trim, lowercase, strip accents
///
/// PTA files arrive with inconsistent casing and with or without the
/// French accents, depending on which tool last touched them.
pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .chars()
        .map(|c| match c {
            'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
            'à' | 'â' | 'ä' | 'À' | 'Â' | 'Ä' => 'a',
            'î' | 'ï' | 'Î' | 'Ï' => 'i',
            'ô' | 'ö' | 'Ô' | 'Ö' => 'o',
            'û' | 'ü' | 'ù' | 'Û' | 'Ü' | 'Ù' => 'u',
            'ç' | 'Ç' => 'c',
            c if c.is_whitespace() => ' ',
            c => c,
        })
        .collect::<String>()
        .to_lowercase()
}

/// Build a map from normalized header to column index
///
/// The first occurrence wins when a header repeats, matching how the data
/// rows are read.
pub fn build_header_map(headers: &[String]) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (i, h) in headers.iter().enumerate() {
        map.entry(normalize_header(h)).or_insert(i);
    }
    map
}

/// Find a column by its canonical header
pub fn find_column(header_map: &HashMap<String, usize>, canonical: &str) -> Option<usize> {
    header_map.get(&normalize_header(canonical)).copied()
}

impl ColumnMap {
    /// Resolve the column map against a header row
    ///
    /// `key_column` is the user-selected key header; `None` selects the
    /// first column of the sheet. Returns the missing canonical headers on
    /// failure so the caller can report them all at once.
    pub fn resolve(
        headers: &[String],
        key_column: Option<&str>,
    ) -> Result<ColumnMap, Vec<String>> {
        let header_map = build_header_map(headers);
        let mut missing = Vec::new();

        let reference = find_column(&header_map, REFERENCE_COLUMN);
        if reference.is_none() {
            missing.push(REFERENCE_COLUMN.to_string());
        }
        let mass = find_column(&header_map, MASS_COLUMN);
        if mass.is_none() {
            missing.push(MASS_COLUMN.to_string());
        }

        let key = match key_column {
            Some(name) => {
                let found = find_column(&header_map, name);
                if found.is_none() {
                    missing.push(name.to_string());
                }
                found
            }
            None => Some(0),
        };

        if !missing.is_empty() {
            return Err(missing);
        }

        Ok(ColumnMap {
            // Both unwraps guarded by the missing check above
            key: key.unwrap_or(0),
            reference: reference.unwrap_or(0),
            mass: mass.unwrap_or(0),
            motor: find_column(&header_map, MOTOR_COLUMN),
        })
    }
}
