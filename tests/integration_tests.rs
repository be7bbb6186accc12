//! Integration tests for the ptadiff CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd,
//! over generated CSV and xlsx fixtures.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to get a ptadiff command
fn ptadiff() -> Command {
    Command::cargo_bin("ptadiff").unwrap()
}

const CSV_HEADER: &str = "Version,Moteur,Référence,Masse suspendue en charge de référence\n";
const CSV_UNITS: &str = "-,-,-,kg\n";

/// Write a CSV PTA fixture with the standard header and units rows
fn write_csv(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("{}{}{}", CSV_HEADER, CSV_UNITS, body)).unwrap();
    path
}

/// Standard old/new fixture pair: one spring change, one new key, one removed key
fn setup_pair(dir: &Path) -> (PathBuf, PathBuf) {
    let old = write_csv(
        dir,
        "old.csv",
        "A7-1,DV5,R-100,1200\nA7-2,DV5,R-200,1250\nA7-3,EB2,R-300,1300\n",
    );
    let new = write_csv(
        dir,
        "new.csv",
        "A7-1,DV5,R-100,1200\nA7-2,DV5,R-210,1250\nA7-4,EB2T,R-400,1400\n",
    );
    (old, new)
}

/// Write an xlsx PTA fixture on the given sheet
fn write_xlsx(dir: &Path, name: &str, sheet: &str, rows: &[(&str, &str, &str, f64)]) -> PathBuf {
    use rust_xlsxwriter::Workbook;

    let path = dir.join(name);
    let mut workbook = Workbook::new();
    let ws = workbook.add_worksheet();
    ws.set_name(sheet).unwrap();

    let headers = [
        "Version",
        "Moteur",
        "Référence",
        "Masse suspendue en charge de référence",
    ];
    for (c, h) in headers.iter().enumerate() {
        ws.write_string(0, c as u16, *h).unwrap();
    }
    for (c, u) in ["-", "-", "-", "kg"].iter().enumerate() {
        ws.write_string(1, c as u16, *u).unwrap();
    }
    for (r, (key, motor, reference, mass)) in rows.iter().enumerate() {
        let row = (r + 2) as u32;
        ws.write_string(row, 0, *key).unwrap();
        ws.write_string(row, 1, *motor).unwrap();
        ws.write_string(row, 2, *reference).unwrap();
        ws.write_number(row, 3, *mass).unwrap();
    }
    workbook.save(&path).unwrap();
    path
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    ptadiff()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("PTA Change Toolkit"));
}

#[test]
fn test_version_displays() {
    ptadiff()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ptadiff"));
}

#[test]
fn test_completions_bash() {
    ptadiff()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ptadiff"));
}

// ============================================================================
// Inspect
// ============================================================================

#[test]
fn test_inspect_csv() {
    let tmp = TempDir::new().unwrap();
    let (old, _) = setup_pair(tmp.path());

    ptadiff()
        .arg("inspect")
        .arg(&old)
        .assert()
        .success()
        .stdout(predicate::str::contains("Data rows:   3"))
        .stdout(predicate::str::contains("valid PTA table"));
}

#[test]
fn test_inspect_json() {
    let tmp = TempDir::new().unwrap();
    let (old, _) = setup_pair(tmp.path());

    ptadiff()
        .args(["-f", "json", "inspect"])
        .arg(&old)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"rows\": 3"))
        .stdout(predicate::str::contains("\"DV5\""));
}

#[test]
fn test_inspect_missing_file_fails() {
    ptadiff()
        .args(["inspect", "/nonexistent/pta.xlsx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_inspect_unsupported_extension_fails() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("pta.pdf");
    fs::write(&path, "not a workbook").unwrap();

    ptadiff()
        .arg("inspect")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported file format"));
}

#[test]
fn test_inspect_missing_columns_fails() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.csv");
    fs::write(&path, "Version,Moteur\n-,-\nA7-1,DV5\n").unwrap();

    ptadiff()
        .arg("inspect")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing columns"));
}

// ============================================================================
// Analyze
// ============================================================================

#[test]
fn test_analyze_dashboard() {
    let tmp = TempDir::new().unwrap();
    let (old, new) = setup_pair(tmp.path());

    ptadiff()
        .arg("analyze")
        .arg("--old")
        .arg(&old)
        .arg("--new")
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("PTA Change Analysis"))
        .stdout(predicate::str::contains("Spring changed cars"))
        .stdout(predicate::str::contains("Spring change rate"));
}

#[test]
fn test_analyze_json_summary() {
    let tmp = TempDir::new().unwrap();
    let (old, new) = setup_pair(tmp.path());

    ptadiff()
        .args(["-f", "json", "analyze"])
        .arg("--old")
        .arg(&old)
        .arg("--new")
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"spring_changed\": 1"))
        .stdout(predicate::str::contains("\"new\": 1"))
        .stdout(predicate::str::contains("\"removed\": 1"))
        .stdout(predicate::str::contains("\"pta_type\": \"vp\""));
}

#[test]
fn test_analyze_markdown_report() {
    let tmp = TempDir::new().unwrap();
    let (old, new) = setup_pair(tmp.path());
    let report = tmp.path().join("report.md");

    ptadiff()
        .arg("analyze")
        .arg("--old")
        .arg(&old)
        .arg("--new")
        .arg(&new)
        .arg("-o")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    let content = fs::read_to_string(&report).unwrap();
    assert!(content.contains("# PTA Change Analysis"));
    assert!(content.contains("## Changes"));
    assert!(content.contains("## Motors"));
}

#[test]
fn test_analyze_pta_type_flag() {
    let tmp = TempDir::new().unwrap();
    let (old, new) = setup_pair(tmp.path());

    ptadiff()
        .args(["-f", "json", "analyze", "--pta-type", "vu"])
        .arg("--old")
        .arg(&old)
        .arg("--new")
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"pta_type\": \"vu\""));
}

// ============================================================================
// Diff
// ============================================================================

#[test]
fn test_diff_table_lists_changes() {
    let tmp = TempDir::new().unwrap();
    let (old, new) = setup_pair(tmp.path());

    ptadiff()
        .arg("diff")
        .arg("--old")
        .arg(&old)
        .arg("--new")
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("Spring Changed"))
        .stdout(predicate::str::contains("Removed"))
        .stdout(predicate::str::contains("change(s) shown"));
}

#[test]
fn test_diff_changed_only_hides_unchanged() {
    let tmp = TempDir::new().unwrap();
    let (old, new) = setup_pair(tmp.path());

    ptadiff()
        .args(["diff", "--changed-only"])
        .arg("--old")
        .arg(&old)
        .arg("--new")
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("A7-1").not());
}

#[test]
fn test_diff_change_type_filter() {
    let tmp = TempDir::new().unwrap();
    let (old, new) = setup_pair(tmp.path());

    ptadiff()
        .args(["diff", "--change-type", "new"])
        .arg("--old")
        .arg(&old)
        .arg("--new")
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("A7-4"))
        .stdout(predicate::str::contains("A7-2").not());
}

#[test]
fn test_diff_csv_format() {
    let tmp = TempDir::new().unwrap();
    let (old, new) = setup_pair(tmp.path());

    ptadiff()
        .args(["-f", "csv", "diff", "--changed-only"])
        .arg("--old")
        .arg(&old)
        .arg("--new")
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "key,change,old_ref,new_ref,mass",
        ))
        .stdout(predicate::str::contains("A7-2,spring-changed,R-200,R-210"));
}

#[test]
fn test_diff_json_includes_rows() {
    let tmp = TempDir::new().unwrap();
    let (old, new) = setup_pair(tmp.path());

    ptadiff()
        .args(["-f", "json", "diff", "--change-type", "spring-changed"])
        .arg("--old")
        .arg(&old)
        .arg("--new")
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"change_type\": \"spring-changed\""))
        .stdout(predicate::str::contains("\"row_new\": 4"));
}

#[test]
fn test_diff_mass_tolerance() {
    let tmp = TempDir::new().unwrap();
    let old = write_csv(tmp.path(), "old.csv", "A7-1,DV5,R-100,1200\n");
    let new = write_csv(tmp.path(), "new.csv", "A7-1,DV5,R-100,\"1200,4\"\n");

    // Strict: the mass wiggle flags the row as modified
    ptadiff()
        .args(["-f", "csv", "diff", "--changed-only"])
        .arg("--old")
        .arg(&old)
        .arg("--new")
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("modified"));

    // With tolerance the row is unchanged
    ptadiff()
        .args(["-f", "csv", "diff", "--changed-only", "--mass-tolerance", "0.5"])
        .arg("--old")
        .arg(&old)
        .arg("--new")
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("modified").not());
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_export_writes_report() {
    use calamine::{open_workbook_auto, Reader};

    let tmp = TempDir::new().unwrap();
    let (old, new) = setup_pair(tmp.path());
    let report = tmp.path().join("report.xlsx");

    ptadiff()
        .arg("export")
        .arg("--old")
        .arg(&old)
        .arg("--new")
        .arg(&new)
        .arg("-o")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    let workbook = open_workbook_auto(&report).unwrap();
    let names = workbook.sheet_names().to_vec();
    assert!(names.contains(&"PTA".to_string()) || names.contains(&"csv".to_string()));
    assert!(names.contains(&"Summary".to_string()));
    assert!(names.contains(&"Changes".to_string()));
    assert!(names.contains(&"Motors".to_string()));
}

#[test]
fn test_export_refuses_overwrite_without_force() {
    let tmp = TempDir::new().unwrap();
    let (old, new) = setup_pair(tmp.path());
    let report = tmp.path().join("report.xlsx");
    fs::write(&report, "existing").unwrap();

    ptadiff()
        .arg("export")
        .arg("--old")
        .arg(&old)
        .arg("--new")
        .arg(&new)
        .arg("-o")
        .arg(&report)
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to overwrite"));
}

#[test]
fn test_export_force_overwrites() {
    let tmp = TempDir::new().unwrap();
    let (old, new) = setup_pair(tmp.path());
    let report = tmp.path().join("report.xlsx");
    fs::write(&report, "existing").unwrap();

    ptadiff()
        .args(["export", "--force"])
        .arg("--old")
        .arg(&old)
        .arg("--new")
        .arg(&new)
        .arg("-o")
        .arg(&report)
        .assert()
        .success();

    // Overwritten with a real workbook, not the placeholder text
    assert!(fs::metadata(&report).unwrap().len() > 1000);
}

// ============================================================================
// Motors
// ============================================================================

#[test]
fn test_motors_lists_union() {
    let tmp = TempDir::new().unwrap();
    let (old, new) = setup_pair(tmp.path());

    ptadiff()
        .arg("motors")
        .arg(&old)
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 unique motor type(s)"))
        .stdout(predicate::str::contains("DV5"))
        .stdout(predicate::str::contains("EB2"))
        .stdout(predicate::str::contains("EB2T"));
}

#[test]
fn test_motors_quiet_plain_list() {
    let tmp = TempDir::new().unwrap();
    let (old, _) = setup_pair(tmp.path());

    ptadiff()
        .args(["-q", "motors"])
        .arg(&old)
        .assert()
        .success()
        .stdout(predicate::str::contains("unique motor").not())
        .stdout(predicate::str::contains("DV5"));
}

// ============================================================================
// xlsx end-to-end
// ============================================================================

#[test]
fn test_analyze_xlsx_inputs() {
    let tmp = TempDir::new().unwrap();
    let old = write_xlsx(
        tmp.path(),
        "old.xlsx",
        "PTA",
        &[("A7-1", "DV5", "R-100", 1200.0), ("A7-2", "DV5", "R-200", 1250.0)],
    );
    let new = write_xlsx(
        tmp.path(),
        "new.xlsx",
        "PTA",
        &[("A7-1", "DV5", "R-110", 1200.0), ("A7-2", "DV5", "R-200", 1250.0)],
    );

    ptadiff()
        .args(["-f", "json", "analyze"])
        .arg("--old")
        .arg(&old)
        .arg("--new")
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"spring_changed\": 1"))
        .stdout(predicate::str::contains("\"unchanged\": 1"));
}

#[test]
fn test_sheet_override() {
    let tmp = TempDir::new().unwrap();
    let old = write_xlsx(
        tmp.path(),
        "old.xlsx",
        "Ressorts",
        &[("A7-1", "DV5", "R-100", 1200.0)],
    );
    let new = write_xlsx(
        tmp.path(),
        "new.xlsx",
        "Ressorts",
        &[("A7-1", "DV5", "R-100", 1200.0)],
    );

    // Default sheet name is missing
    ptadiff()
        .arg("analyze")
        .arg("--old")
        .arg(&old)
        .arg("--new")
        .arg(&new)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"))
        .stderr(predicate::str::contains("Ressorts"));

    // Explicit sheet works
    ptadiff()
        .args(["analyze", "--sheet", "Ressorts"])
        .arg("--old")
        .arg(&old)
        .arg("--new")
        .arg(&new)
        .assert()
        .success();
}

#[test]
fn test_duplicate_key_warning_on_stderr() {
    let tmp = TempDir::new().unwrap();
    let old = write_csv(
        tmp.path(),
        "old.csv",
        "A7-1,DV5,R-100,1200\nA7-1,DV5,R-150,1210\n",
    );
    let new = write_csv(tmp.path(), "new.csv", "A7-1,DV5,R-100,1200\n");

    ptadiff()
        .arg("analyze")
        .arg("--old")
        .arg(&old)
        .arg("--new")
        .arg(&new)
        .assert()
        .success()
        .stderr(predicate::str::contains("duplicate key"));
}
