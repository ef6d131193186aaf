use icd_bio_assign::{ColumnSelection, IcdBioAssign, IcdRevision, MergeRule};

use crate::utils::{Workspace, quiet_config, read_output, strings};

const PRIMARY_CSV: &str = "\
eid,41202-0.0,41202-0.1,41202-0.2
1001,I219,nan,nan
1002,J450,E110,nan
1003,nan,nan,nan
1004,I252,nan,nan
";

const SECONDARY_CSV: &str = "\
eid,41204-0.0,41204-0.1,41204-0.2
1001,J46,nan,nan
1002,nan,nan,nan
1003,E10,nan,nan
";

const ICD9_CSV: &str = "\
eid,41203-0.0,41203-0.1
1001,4109,nan
1002,25000,nan
";

fn matched_engine(ws: &Workspace) -> IcdBioAssign {
    let mut engine = IcdBioAssign::new(&ws.definitions(), quiet_config()).unwrap();
    let primary = ws.file("primary.csv", PRIMARY_CSV);
    let secondary = ws.file("secondary.csv", SECONDARY_CSV);
    assert_eq!(
        engine
            .set_definitions(&primary, &ColumnSelection::All, IcdRevision::Icd10)
            .unwrap(),
        4
    );
    assert_eq!(
        engine
            .set_definitions(&secondary, &ColumnSelection::All, IcdRevision::Icd10)
            .unwrap(),
        3
    );
    engine
}

#[test]
fn test_maximum_merge_written_and_read_back() {
    let ws = Workspace::new();
    let out = ws.path().join("results").join("phenotypes.csv");

    let output = matched_engine(&ws).compile_and_write("Maximum", &out).unwrap();
    assert_eq!(output.complete_count(), 3);
    assert_eq!(output.incomplete_count(), 1);

    let table = read_output(&out);
    assert_eq!(
        table.headers,
        strings(&["ID", "myocardial_infarction", "asthma", "diabetes", "no_codes"])
    );
    assert_eq!(
        table.rows,
        vec![
            strings(&["1001", "1", "1", "0", "0"]),
            strings(&["1002", "0", "1", "1", "0"]),
            strings(&["1003", "0", "0", "1", "0"]),
            strings(&["1004"]),
        ]
    );
}

#[test]
fn test_constant_merge_requires_every_dataset() {
    let ws = Workspace::new();
    let output = matched_engine(&ws).compile(MergeRule::Constant);

    let records: Vec<Vec<String>> = output.rows.iter().map(|row| row.to_record()).collect();
    assert_eq!(
        records,
        vec![
            strings(&["1001", "0", "0", "0", "0"]),
            strings(&["1002", "0", "0", "0", "0"]),
            strings(&["1003", "0", "0", "0", "0"]),
            strings(&["1004"]),
        ]
    );
}

#[test]
fn test_phenotype_without_codes_is_always_zero() {
    let ws = Workspace::new();
    let output = matched_engine(&ws).compile(MergeRule::Maximum);
    let no_codes = output.headers.iter().position(|h| h == "no_codes").unwrap() - 1;

    for row in &output.rows {
        if let Some(values) = &row.values {
            assert_eq!(values[no_codes], 0, "subject {}", row.id);
        }
    }
    assert!(output.case_counts().contains(&("no_codes", 0)));
}

#[test]
fn test_icd9_extract_merges_with_icd10_extract() {
    let ws = Workspace::new();
    let mut engine = IcdBioAssign::new(&ws.definitions(), quiet_config()).unwrap();
    let primary = ws.file("primary.csv", PRIMARY_CSV);
    let icd9 = ws.file("icd9.csv", ICD9_CSV);

    engine
        .set_definitions(&primary, &ColumnSelection::All, IcdRevision::Icd10)
        .unwrap();
    engine
        .set_definitions(&icd9, &ColumnSelection::All, IcdRevision::Icd9)
        .unwrap();

    // ICD-9 rows: 1001 has 4109 (410..412), 1002 has 25000 (250)
    assert_eq!(engine.datasets()[1].rows[0].values, vec![1, 0, 0, 0]);
    assert_eq!(engine.datasets()[1].rows[1].values, vec![0, 0, 1, 0]);

    let output = engine.compile(MergeRule::Maximum);
    assert_eq!(output.rows[0].values, Some(vec![1, 0, 0, 0]));
    assert_eq!(output.rows[1].values, Some(vec![0, 1, 1, 0]));
    assert_eq!(output.rows[2].values, None);
    assert_eq!(output.rows[3].values, None);
}

#[test]
fn test_scan_span_applies_after_identifier_removal() {
    let ws = Workspace::new();
    let mut engine = IcdBioAssign::new(&ws.definitions(), quiet_config()).unwrap();
    let extract = ws.file(
        "extract.csv",
        "eid,41202-0.0,41202-0.1\n1001,I21,J45\n",
    );

    // "41202" resolves to columns [1, 2]; the span [1, 2) is taken from the row
    // with the identifier removed, so only the second code field is scanned.
    engine
        .set_definitions(&extract, &ColumnSelection::from("41202"), IcdRevision::Icd10)
        .unwrap();
    assert_eq!(engine.datasets()[0].rows[0].values, vec![0, 1, 0, 0]);
}

#[test]
fn test_single_dataset_written_without_merge() {
    let ws = Workspace::new();
    let engine = matched_engine(&ws);
    let out = ws.path().join("secondary_only.csv");

    engine.write_dataset(1, &out).unwrap();
    let table = read_output(&out);
    assert_eq!(table.headers[0], "ID");
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[2], strings(&["1003", "0", "0", "1", "0"]));
}

#[test]
fn test_malformed_icd9_definitions_abort() {
    let ws = Workspace::new();
    let definitions = ws.file(
        "bad_definitions.csv",
        "phenotype,icd9_min,icd9_max,icd10_1\nbroken,1 2,5,I21\n",
    );

    let err = IcdBioAssign::new(&definitions, quiet_config()).unwrap_err();
    assert!(err.is_input());
    assert!(err.to_string().contains("broken"));
}

#[test]
fn test_missing_extract_is_reported() {
    let ws = Workspace::new();
    let mut engine = IcdBioAssign::new(&ws.definitions(), quiet_config()).unwrap();
    let err = engine
        .set_definitions(
            &ws.path().join("absent.csv"),
            &ColumnSelection::All,
            IcdRevision::Icd10,
        )
        .unwrap_err();
    assert!(err.to_string().contains("absent.csv"));
    assert!(engine.datasets().is_empty());
}
