//! Integration test: `vigil check` over real files in a temporary
//! directory, mixing JSON and YAML documents.

use std::path::{Path, PathBuf};

use vigil_cli::check::{check_documents, run_check, CheckArgs};

const SCHEMA: &str = r#"{
    "type": "object",
    "required": ["name", "joined"],
    "properties": {
        "name": {"type": "string", "format": "strong_name"},
        "joined": {"type": "string", "format": "iso_8601_date"},
        "balance": {"type": "string", "format": "decimal_by_factor_of_8"}
    }
}"#;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn args(schema: PathBuf, documents: Vec<PathBuf>) -> CheckArgs {
    CheckArgs {
        schema,
        documents,
        json: false,
        draft: None,
        no_formats: false,
    }
}

#[test]
fn mixed_json_and_yaml_documents() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "member.schema.json", SCHEMA);
    let good = write(dir.path(), "good.json", r#"{"name": "Ada", "joined": "2024-02-29"}"#);
    let bad = write(
        dir.path(),
        "bad.yaml",
        "name: 7of9\njoined: '2025-02-30'\nbalance: '0.123456789'\n",
    );

    let report = check_documents(&args(schema.clone(), vec![good.clone(), bad.clone()])).unwrap();
    assert!(!report.is_valid());
    assert_eq!(report.invalid_count(), 1);

    let good_result = &report.results[&good.display().to_string()];
    assert!(good_result.is_valid());

    let bad_result = &report.results[&bad.display().to_string()];
    assert_eq!(bad_result.field_errors("name"), ["INVALID_FORMAT"]);
    assert_eq!(bad_result.field_errors("joined"), ["INVALID_FORMAT"]);
    assert_eq!(bad_result.field_errors("balance"), ["INVALID_FORMAT"]);

    assert_eq!(run_check(&args(schema.clone(), vec![good])).unwrap(), 0);
    assert_eq!(run_check(&args(schema, vec![bad])).unwrap(), 1);
}

#[test]
fn yaml_schema_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(
        dir.path(),
        "schema.yaml",
        "type: object\nrequired: [id]\nproperties:\n  id:\n    type: integer\n",
    );
    let doc = write(dir.path(), "doc.json", r#"{}"#);

    let report = check_documents(&args(schema, vec![doc.clone()])).unwrap();
    let result = &report.results[&doc.display().to_string()];
    assert_eq!(result.field_errors("id"), ["REQUIRED_ATTRIBUTE_MISSING"]);
}

#[test]
fn no_formats_turns_format_into_annotation() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "s.json", SCHEMA);
    let doc = write(dir.path(), "d.json", r#"{"name": "Ada", "joined": "2025-02-30"}"#);

    let mut check = args(schema, vec![doc]);
    check.no_formats = true;
    assert!(check_documents(&check).unwrap().is_valid());
}

#[test]
fn unreadable_document_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "s.json", SCHEMA);
    let broken = write(dir.path(), "broken.json", "{\"name\": ");
    let missing = dir.path().join("missing.json");

    assert!(check_documents(&args(schema.clone(), vec![broken])).is_err());
    assert!(check_documents(&args(schema, vec![missing])).is_err());
}

#[test]
fn malformed_schema_reports_global_error() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "s.json", r#"{"type": 42}"#);
    let doc = write(dir.path(), "d.json", "{}");

    let report = check_documents(&args(schema, vec![doc.clone()])).unwrap();
    let result = &report.results[&doc.display().to_string()];
    assert_eq!(result.global_errors().len(), 1);
}

#[test]
fn yaml_numbers_are_format_checked() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(
        dir.path(),
        "fee.schema.json",
        r#"{"type": "object", "properties": {"fee": {"type": "number", "format": "decimal_by_factor_of_8"}}}"#,
    );
    let fine = write(dir.path(), "fine.yaml", "fee: 0.00000125\n");
    let precise = write(dir.path(), "precise.yml", "fee: 0.123456789\n");

    let report = check_documents(&args(schema, vec![fine.clone(), precise.clone()])).unwrap();
    assert!(report.results[&fine.display().to_string()].is_valid());
    assert_eq!(
        report.results[&precise.display().to_string()].field_errors("fee"),
        ["INVALID_FORMAT"]
    );
}
