use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write_document(dir: &Path, name: &str, document: &Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(document).unwrap()).unwrap();
    path
}

fn input_document() -> Value {
    json!({
        "version": "1.0",
        "type": "input",
        "is_batch": false,
        "attributes": {"node": ["id", "u_rated"]},
        "data": {
            "node": [[1, 10.5e3], [2, 10.5e3]],
            "source": [{"id": 3, "node": 1, "status": 1, "u_ref": 1.0, "sk": "inf"}]
        }
    })
}

fn batch_document() -> Value {
    json!({
        "version": "1.0",
        "type": "update",
        "is_batch": true,
        "data": [
            {"sym_load": [{"id": 7, "p_specified": 1.0}]},
            {},
            {"sym_load": [{"id": 7}, {"id": 8, "status": 0}]}
        ]
    })
}

fn pgm() -> Command {
    Command::cargo_bin("pgm").unwrap()
}

#[test]
fn pgm_inspect_plain_lists_components() {
    let dir = tempdir().unwrap();
    let file = write_document(dir.path(), "batch.json", &batch_document());
    pgm()
        .args(["inspect", file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("sym_load"))
        .stdout(predicate::str::contains("variable"));
}

#[test]
fn pgm_inspect_json_reports_descriptors() {
    let dir = tempdir().unwrap();
    let file = write_document(dir.path(), "input.json", &input_document());
    let output = pgm()
        .args(["inspect", file.to_str().unwrap(), "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["dataset"], "input");
    assert_eq!(report["batch_size"], 1);
    let components = report["components"].as_array().unwrap();
    assert_eq!(components[0]["component"], "node");
    assert_eq!(components[0]["elements_per_scenario"], 2);
    assert_eq!(components[0]["total_elements"], 2);
    assert_eq!(components[0]["declared_attributes"], json!(["id", "u_rated"]));
    assert_eq!(components[1]["component"], "source");
}

#[test]
fn pgm_parse_json_round_trips_values() {
    let dir = tempdir().unwrap();
    let file = write_document(dir.path(), "input.json", &input_document());
    let out = dir.path().join("parsed.json");
    pgm()
        .args([
            "parse",
            file.to_str().unwrap(),
            "--format",
            "json",
            "--out",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let parsed: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(parsed["type"], "input");
    assert_eq!(parsed["data"]["node"][1], json!({"id": 2, "u_rated": 10500.0}));
    assert_eq!(parsed["data"]["source"][0]["sk"], "inf");
    assert!(parsed["data"]["source"][0].get("rx_ratio").is_none());
}

#[test]
fn pgm_parse_batch_groups_by_scenario() {
    let dir = tempdir().unwrap();
    let file = write_document(dir.path(), "batch.json", &batch_document());
    let output = pgm()
        .args(["parse", file.to_str().unwrap(), "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: Value = serde_json::from_slice(&output.stdout).unwrap();
    let scenarios = parsed["data"].as_array().unwrap();
    assert_eq!(scenarios.len(), 3);
    assert_eq!(scenarios[0]["sym_load"][0]["p_specified"], 1.0);
    assert_eq!(scenarios[1], json!({}));
    assert_eq!(scenarios[2]["sym_load"][1], json!({"id": 8, "status": 0}));
}

#[test]
fn pgm_parse_plain_renders_tables() {
    let dir = tempdir().unwrap();
    let file = write_document(dir.path(), "input.json", &input_document());
    pgm()
        .args(["parse", file.to_str().unwrap(), "--component", "node"])
        .assert()
        .success()
        .stdout(predicate::str::contains("node (2 records)"))
        .stdout(predicate::str::contains("U_RATED"))
        .stdout(predicate::str::contains("source").not());
}

#[test]
fn pgm_parse_rejects_unknown_component_selection() {
    let dir = tempdir().unwrap();
    let file = write_document(dir.path(), "input.json", &input_document());
    pgm()
        .args(["parse", file.to_str().unwrap(), "--component", "sym_output"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sym_output"));
}

#[test]
fn pgm_parse_reports_error_position() {
    let dir = tempdir().unwrap();
    let file = write_document(
        dir.path(),
        "bad.json",
        &json!({
            "version": "1.0",
            "type": "input",
            "is_batch": true,
            "attributes": {"node": ["id"]},
            "data": [{"node": [[true]]}]
        }),
    );
    pgm()
        .args(["parse", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Position of error: data/0/node/0/0"));
}

#[test]
fn pgm_inspect_missing_file_fails() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    pgm()
        .args(["inspect", missing.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.json"));
}

#[test]
fn pgm_schema_lists_component_layout() {
    pgm()
        .args(["schema", "--dataset", "input", "--component", "node"])
        .assert()
        .success()
        .stdout(predicate::str::contains("input/node (16 bytes, align 8)"))
        .stdout(predicate::str::contains("u_rated"))
        .stdout(predicate::str::contains("double"));
}

#[test]
fn pgm_schema_json_has_offsets() {
    let output = pgm()
        .args(["schema", "--dataset", "update", "--component", "sym_load", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let schema: Value = serde_json::from_slice(&output.stdout).unwrap();
    let sym_load = &schema["update"][0];
    assert_eq!(sym_load["name"], "sym_load");
    assert_eq!(sym_load["attributes"][0]["name"], "id");
    assert_eq!(sym_load["attributes"][0]["offset"], 0);
}

#[test]
fn pgm_schema_unknown_dataset_fails() {
    pgm()
        .args(["schema", "--dataset", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn pgm_completions_bash() {
    pgm()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pgm"));
}
