// tests/batch_runs.rs
use mt5_csv_tools::batch::discover_csv_files;
use mt5_csv_tools::{run_batch, BatchStatus, CsvToolError, FileOutcome, ToolConfig};
use std::fs;
use tempfile::tempdir;

fn config_for(dir: &std::path::Path) -> ToolConfig {
    ToolConfig {
        data_dir: dir.to_path_buf(),
        ..Default::default()
    }
}

#[test]
fn test_batch_processes_each_csv_once() {
    let temp = tempdir().expect("tempdir");
    let dir = temp.path();
    fs::write(dir.join("A.csv"), "1993.04.12 00:00;1.1;1.2;1.0;1.15;100\n").unwrap();
    fs::write(dir.join("B.CSV"), "").unwrap();
    fs::write(dir.join("C.csv"), "x,y,z\n").unwrap();
    fs::write(dir.join("notes.txt"), "not a csv").unwrap();
    fs::create_dir(dir.join("nested")).unwrap();
    fs::write(dir.join("nested").join("D.csv"), "1993.04.12,1,2,0.5,1.5,1\n").unwrap();

    let summary = run_batch(&config_for(dir)).expect("batch runs");

    assert_eq!(summary.status(), BatchStatus::Completed);
    assert_eq!(summary.reports.len(), 3);
    assert!(matches!(summary.reports[0].outcome, FileOutcome::Normalized { .. }));
    assert_eq!(summary.reports[1].outcome, FileOutcome::SkippedEmpty);
    assert_eq!(summary.reports[2].outcome, FileOutcome::SkippedNoValidRows);

    // nested directories are not searched
    assert_eq!(
        fs::read_to_string(dir.join("nested").join("D.csv")).unwrap(),
        "1993.04.12,1,2,0.5,1.5,1\n"
    );

    assert_eq!(
        summary.reports[0].summary_line(),
        "OK       A.csv: normalized in place, backup A.csv.bak - 1 rows, 0 invalid (0.0%)"
    );
    assert_eq!(summary.reports[1].summary_line(), "SKIPPED  B.CSV: empty or unreadable");
    assert_eq!(
        summary.reports[2].summary_line(),
        "SKIPPED  C.csv: no valid rows found - 1 rows, 1 invalid (100.0%)"
    );
}

#[test]
fn test_side_files_are_not_reprocessed() {
    let temp = tempdir().expect("tempdir");
    let dir = temp.path();
    fs::write(dir.join("EURUSD.csv"), "1993.04.12,1,2,0.5,1.5,1\n").unwrap();
    fs::write(dir.join("EURUSD_FIXED.csv"), "datetime,open,high,low,close,volume\n").unwrap();

    let files = discover_csv_files(dir, "_FIXED").unwrap();
    assert_eq!(files, vec![dir.join("EURUSD.csv")]);
}

#[test]
fn test_empty_directory_reports_no_input() {
    let temp = tempdir().expect("tempdir");

    let summary = run_batch(&config_for(temp.path())).expect("batch runs");

    assert_eq!(summary.status(), BatchStatus::NoInputFiles);
    assert!(summary.reports.is_empty());
}

#[test]
fn test_missing_base_dir_aborts_batch() {
    let temp = tempdir().expect("tempdir");
    let missing = temp.path().join("Forex-H4-Data");

    let err = run_batch(&config_for(&missing)).unwrap_err();

    assert!(matches!(err, CsvToolError::BaseDirMissing(ref p) if *p == missing));
}

#[test]
fn test_summary_serializes_to_json() {
    let temp = tempdir().expect("tempdir");
    fs::write(temp.path().join("A.csv"), "1993.04.12 00:00,1.1,1.2,1.0,1.15,100\n").unwrap();

    let summary = run_batch(&config_for(temp.path())).unwrap();
    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["reports"][0]["outcome"]["status"], "normalized");
    assert_eq!(json["reports"][0]["stats"]["total"], 1);
    assert_eq!(json["reports"][0]["delimiter"], "comma");
}
