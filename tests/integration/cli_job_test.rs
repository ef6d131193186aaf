use std::process::Command;

use icd_bio_assign::{IcdBioAssign, JobConfig, MergeRule};

use crate::utils::{Workspace, read_output, strings};

const EXTRACT_CSV: &str = "\
eid,41202-0.0,41202-0.1
2001,I210,nan
2002,nan,nan
2003,J459,E119
";

const EXTRACT_NA_CSV: &str = "\
eid,41204-0.0,41204-0.1
2001,NA,E10
2003,NA,NA
";

#[test]
fn test_job_file_run() {
    let ws = Workspace::new();
    ws.definitions();
    ws.file("primary.csv", EXTRACT_CSV);
    ws.file("secondary.csv", EXTRACT_NA_CSV);
    let job_path = ws.file(
        "job.json",
        r#"{
            "definitions": "definitions.csv",
            "output": "out/phenotypes.csv",
            "merger": "Maximum",
            "missing_token": "NA",
            "extracts": [
                {"path": "primary.csv", "column_indexes": [0, 2]},
                {"path": "secondary.csv", "column_indexes": null}
            ]
        }"#,
    );

    let mut job = JobConfig::from_path(&job_path).unwrap();
    job.assign.show_progress = false;
    assert_eq!(job.merger, MergeRule::Maximum);

    let output = IcdBioAssign::run(&job).unwrap();
    assert_eq!(output.rows.len(), 3);

    let table = read_output(&ws.path().join("out").join("phenotypes.csv"));
    assert_eq!(
        table.rows,
        vec![
            strings(&["2001", "1", "0", "1", "0"]),
            strings(&["2002"]),
            strings(&["2003", "0", "1", "1", "0"]),
        ]
    );
}

#[test]
fn test_job_with_invalid_column_selection_reads_nothing() {
    let ws = Workspace::new();
    let job_path = ws.file(
        "job.json",
        r#"{
            "definitions": "missing_definitions.csv",
            "output": "out.csv",
            "extracts": [{"path": "primary.csv", "column_indexes": 41202}]
        }"#,
    );

    let err = JobConfig::from_path(&job_path).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("found a number (41202)"));
    assert!(!ws.path().join("out.csv").exists());
}

#[test]
fn test_failed_extract_leaves_no_output() {
    let ws = Workspace::new();
    ws.definitions();
    ws.file("primary.csv", EXTRACT_CSV);
    let job_path = ws.file(
        "job.json",
        r#"{
            "definitions": "definitions.csv",
            "output": "out.csv",
            "extracts": [
                {"path": "primary.csv"},
                {"path": "does_not_exist.csv"}
            ]
        }"#,
    );

    let mut job = JobConfig::from_path(&job_path).unwrap();
    job.assign.show_progress = false;
    assert!(IcdBioAssign::run(&job).is_err());
    assert!(!ws.path().join("out.csv").exists());
}

#[test]
fn test_cli_assign_command() {
    let ws = Workspace::new();
    let definitions = ws.definitions();
    let extract = ws.file("primary.csv", EXTRACT_CSV);
    let out = ws.path().join("cli_out.csv");

    let status = Command::new(env!("CARGO_BIN_EXE_icd-assign"))
        .arg("assign")
        .arg("--definitions")
        .arg(&definitions)
        .arg("--extract")
        .arg(&extract)
        .arg("--merger")
        .arg("Constant")
        .arg("--output")
        .arg(&out)
        .arg("--quiet")
        .status()
        .unwrap();
    assert!(status.success());

    let table = read_output(&out);
    assert_eq!(table.headers.len(), 5);
    assert_eq!(table.rows[0], strings(&["2001", "1", "0", "0", "0"]));
}

#[test]
fn test_cli_rejects_unknown_merger() {
    let ws = Workspace::new();
    let definitions = ws.definitions();
    let extract = ws.file("primary.csv", EXTRACT_CSV);
    let out = ws.path().join("never.csv");

    let status = Command::new(env!("CARGO_BIN_EXE_icd-assign"))
        .args(["assign", "--quiet", "--merger", "Median"])
        .arg("--definitions")
        .arg(&definitions)
        .arg("--extract")
        .arg(&extract)
        .arg("--output")
        .arg(&out)
        .status()
        .unwrap();
    assert!(!status.success());
    assert!(!out.exists());
}
