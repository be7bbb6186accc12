//! Comparison engine - classifies every vehicle key across two PTA releases
//!
//! For every key present in either table the engine emits one
//! [`ChangeRecord`]: `new` (new-only), `removed` (old-only), or a
//! field-by-field comparison when the key is in both. Reference changes
//! outrank other field changes, matching how the spring office reads the
//! files: a vehicle whose spring reference moved is a "Spring Changed"
//! row no matter what else moved with it.

use serde::Serialize;
use std::collections::HashMap;

use crate::core::schema::{normalize_header, PtaType};
use crate::core::workbook::parse_decimal;
use crate::entities::{ChangeRecord, ChangeType, FieldChange, MassStatus, PtaTable, SpringRecord};

/// Knobs of a comparison run
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Absolute mass tolerance in kg; deltas at or under it count as unchanged
    pub mass_tolerance: f64,
    /// Vehicle family, recorded in the results
    pub pta_type: PtaType,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            mass_tolerance: 0.0,
            pta_type: PtaType::default(),
        }
    }
}

/// Aggregate statistics of one comparison run
#[derive(Debug, Clone, Serialize)]
pub struct ChangeSummary {
    pub old_total: usize,
    pub new_total: usize,
    pub new: usize,
    pub removed: usize,
    pub spring_changed: usize,
    pub modified: usize,
    pub unchanged: usize,
    /// Spring-changed share of the new file, in percent
    pub spring_change_rate: f64,
    pub mass_increased: usize,
    pub mass_decreased: usize,
    /// Sorted unique motor codes across both files
    pub motors: Vec<String>,
    /// Rows dropped for blank keys (old file, new file)
    pub skipped_blank_keys: (usize, usize),
    /// Duplicate keys dropped (old file, new file)
    pub duplicate_keys: (usize, usize),
}

/// Result of comparing two PTA tables
#[derive(Debug, Clone, Serialize)]
pub struct ChangeSet {
    pub pta_type: PtaType,
    pub old_file: String,
    pub new_file: String,
    pub records: Vec<ChangeRecord>,
    pub summary: ChangeSummary,
}

impl ChangeSet {
    /// Records that represent an actual change
    pub fn changes(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.records.iter().filter(|r| r.is_change())
    }
}

/// Compare two loaded PTA tables
pub fn compare(old: &PtaTable, new: &PtaTable, opts: &DiffOptions) -> ChangeSet {
    let old_by_key: HashMap<&str, &SpringRecord> =
        old.records.iter().map(|r| (r.key.as_str(), r)).collect();

    // Old column index per normalized header, so files whose columns moved
    // around still compare the right cells.
    let old_columns: HashMap<String, usize> = old
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| (normalize_header(h), i))
        .collect();

    let mut records = Vec::with_capacity(old.records.len().max(new.records.len()));

    for new_rec in &new.records {
        match old_by_key.get(new_rec.key.as_str()) {
            None => records.push(ChangeRecord {
                key: new_rec.key.clone(),
                change_type: ChangeType::New,
                old_reference: None,
                new_reference: Some(new_rec.reference.clone()),
                mass_status: MassStatus::Unknown,
                old_mass: None,
                new_mass: new_rec.mass,
                row_old: None,
                row_new: Some(new_rec.row),
                field_changes: Vec::new(),
            }),
            Some(old_rec) => {
                records.push(compare_pair(old_rec, new_rec, old, new, &old_columns, opts));
            }
        }
    }

    // Keys that disappeared, in old-file order
    let new_keys: std::collections::HashSet<&str> =
        new.records.iter().map(|r| r.key.as_str()).collect();
    for old_rec in &old.records {
        if !new_keys.contains(old_rec.key.as_str()) {
            records.push(ChangeRecord {
                key: old_rec.key.clone(),
                change_type: ChangeType::Removed,
                old_reference: Some(old_rec.reference.clone()),
                new_reference: None,
                mass_status: MassStatus::Unknown,
                old_mass: old_rec.mass,
                new_mass: None,
                row_old: Some(old_rec.row),
                row_new: None,
                field_changes: Vec::new(),
            });
        }
    }

    let summary = summarize(old, new, &records);

    ChangeSet {
        pta_type: opts.pta_type,
        old_file: old.file_name(),
        new_file: new.file_name(),
        records,
        summary,
    }
}

fn compare_pair(
    old_rec: &SpringRecord,
    new_rec: &SpringRecord,
    old: &PtaTable,
    new: &PtaTable,
    old_columns: &HashMap<String, usize>,
    opts: &DiffOptions,
) -> ChangeRecord {
    let mass_status = mass_status(old_rec.mass, new_rec.mass, opts.mass_tolerance);

    let spring_changed = old_rec.reference != new_rec.reference;
    let field_changes = field_changes(old_rec, new_rec, old, new, old_columns, opts);

    let change_type = if spring_changed {
        ChangeType::SpringChanged
    } else if field_changes.is_empty() {
        ChangeType::Unchanged
    } else {
        ChangeType::Modified
    };

    ChangeRecord {
        key: new_rec.key.clone(),
        change_type,
        old_reference: Some(old_rec.reference.clone()),
        new_reference: Some(new_rec.reference.clone()),
        mass_status,
        old_mass: old_rec.mass,
        new_mass: new_rec.mass,
        row_old: Some(old_rec.row),
        row_new: Some(new_rec.row),
        field_changes,
    }
}

/// Field-by-field comparison over the headers shared by both files
///
/// The key column is the identity and the reference column is classified
/// separately, so both are excluded here. The mass column compares
/// numerically under the configured tolerance.
fn field_changes(
    old_rec: &SpringRecord,
    new_rec: &SpringRecord,
    old: &PtaTable,
    new: &PtaTable,
    old_columns: &HashMap<String, usize>,
    opts: &DiffOptions,
) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    for (new_idx, header) in new.headers.iter().enumerate() {
        if new_idx == new.columns.key || new_idx == new.columns.reference {
            continue;
        }
        let Some(&old_idx) = old_columns.get(&normalize_header(header)) else {
            continue;
        };
        if old_idx == old.columns.key || old_idx == old.columns.reference {
            continue;
        }

        let old_val = old_rec.field(old_idx);
        let new_val = new_rec.field(new_idx);

        let equal = if new_idx == new.columns.mass {
            match (parse_decimal(old_val), parse_decimal(new_val)) {
                (Some(a), Some(b)) => (b - a).abs() <= opts.mass_tolerance,
                _ => values_equal(old_val, new_val),
            }
        } else {
            values_equal(old_val, new_val)
        };

        if !equal {
            changes.push(FieldChange {
                column: header.clone(),
                old: old_val.to_string(),
                new: new_val.to_string(),
            });
        }
    }

    changes
}

/// String equality with numeric fallback, so "1 234,5" equals "1234.5"
fn values_equal(a: &str, b: &str) -> bool {
    if a.trim() == b.trim() {
        return true;
    }
    match (parse_decimal(a), parse_decimal(b)) {
        (Some(x), Some(y)) => (x - y).abs() < 1e-9,
        _ => false,
    }
}

fn mass_status(old: Option<f64>, new: Option<f64>, tolerance: f64) -> MassStatus {
    match (old, new) {
        (Some(old), Some(new)) => {
            let delta = new - old;
            if delta.abs() <= tolerance {
                MassStatus::Unchanged
            } else if delta > 0.0 {
                MassStatus::Increased
            } else {
                MassStatus::Decreased
            }
        }
        _ => MassStatus::Unknown,
    }
}

fn summarize(old: &PtaTable, new: &PtaTable, records: &[ChangeRecord]) -> ChangeSummary {
    let mut counts: HashMap<ChangeType, usize> = HashMap::new();
    let mut mass_increased = 0;
    let mut mass_decreased = 0;
    for r in records {
        *counts.entry(r.change_type).or_insert(0) += 1;
        match r.mass_status {
            MassStatus::Increased => mass_increased += 1,
            MassStatus::Decreased => mass_decreased += 1,
            _ => {}
        }
    }

    let spring_changed = counts.get(&ChangeType::SpringChanged).copied().unwrap_or(0);
    let new_total = new.records.len();
    let spring_change_rate = if new_total > 0 {
        (spring_changed as f64 / new_total as f64) * 100.0
    } else {
        0.0
    };

    let mut motors = old.motors();
    motors.extend(new.motors());

    ChangeSummary {
        old_total: old.records.len(),
        new_total,
        new: counts.get(&ChangeType::New).copied().unwrap_or(0),
        removed: counts.get(&ChangeType::Removed).copied().unwrap_or(0),
        spring_changed,
        modified: counts.get(&ChangeType::Modified).copied().unwrap_or(0),
        unchanged: counts.get(&ChangeType::Unchanged).copied().unwrap_or(0),
        spring_change_rate,
        mass_increased,
        mass_decreased,
        motors: motors.into_iter().collect(),
        skipped_blank_keys: (old.skipped_blank_keys, new.skipped_blank_keys),
        duplicate_keys: (old.duplicate_keys.len(), new.duplicate_keys.len()),
    }
}
