//! Change record types - the per-vehicle delta between two PTA releases

use serde::{Deserialize, Serialize};

/// Classification of a vehicle row across the two files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeType {
    /// Key only present in the new file
    New,
    /// Key only present in the old file
    Removed,
    /// Key in both files, spring reference differs
    SpringChanged,
    /// Key in both files, reference identical, another field differs
    Modified,
    /// Key in both files, nothing differs
    Unchanged,
}

impl ChangeType {
    /// Label used in tables and the Excel report
    pub fn label(&self) -> &'static str {
        match self {
            ChangeType::New => "New",
            ChangeType::Removed => "Removed",
            ChangeType::SpringChanged => "Spring Changed",
            ChangeType::Modified => "Modified",
            ChangeType::Unchanged => "Unchanged",
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeType::New => write!(f, "new"),
            ChangeType::Removed => write!(f, "removed"),
            ChangeType::SpringChanged => write!(f, "spring-changed"),
            ChangeType::Modified => write!(f, "modified"),
            ChangeType::Unchanged => write!(f, "unchanged"),
        }
    }
}

impl std::str::FromStr for ChangeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(ChangeType::New),
            "removed" => Ok(ChangeType::Removed),
            "spring-changed" | "spring_changed" => Ok(ChangeType::SpringChanged),
            "modified" => Ok(ChangeType::Modified),
            "unchanged" => Ok(ChangeType::Unchanged),
            _ => Err(format!(
                "Invalid change type: {}. Use new, removed, spring-changed, modified, or unchanged",
                s
            )),
        }
    }
}

/// Direction of the reference mass between the two files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MassStatus {
    Unchanged,
    Increased,
    Decreased,
    /// One or both masses missing or unparsable
    Unknown,
}

impl Default for MassStatus {
    fn default() -> Self {
        MassStatus::Unknown
    }
}

impl std::fmt::Display for MassStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MassStatus::Unchanged => write!(f, "unchanged"),
            MassStatus::Increased => write!(f, "increased"),
            MassStatus::Decreased => write!(f, "decreased"),
            MassStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// A single field-level difference on a modified row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub column: String,
    pub old: String,
    pub new: String,
}

/// The delta for one vehicle key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub key: String,

    pub change_type: ChangeType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_reference: Option<String>,

    pub mass_status: MassStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_mass: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_mass: Option<f64>,

    /// 1-based sheet row in the old file, absent for new keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_old: Option<u32>,

    /// 1-based sheet row in the new file, absent for removed keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_new: Option<u32>,

    /// Field-level differences, populated for modified rows
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_changes: Vec<FieldChange>,
}

impl ChangeRecord {
    /// True for everything except unchanged rows
    pub fn is_change(&self) -> bool {
        self.change_type != ChangeType::Unchanged
    }
}
