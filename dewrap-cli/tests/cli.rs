use predicates::prelude::*;
use serde_json::{json, Value};
use std::error::Error;
use std::fs;
use std::path::PathBuf;

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn dewrap() -> Result<assert_cmd::Command, Box<dyn Error>> {
    Ok(assert_cmd::Command::cargo_bin("dewrap")?)
}

fn stdout_lines(output: &[u8]) -> Result<Vec<Value>, Box<dyn Error>> {
    let text = String::from_utf8(output.to_vec())?;
    text.lines()
        .map(|line| Ok(serde_json::from_str(line)?))
        .collect()
}

#[test]
fn unwrap_document_to_file() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let output_path = dir.path().join("plain.json");

    dewrap()?
        .args([
            "unwrap",
            &fixture("component.json"),
            "--pointer",
            "/props",
            "-o",
            output_path.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("records: 1"));

    let written: Value = serde_json::from_str(&fs::read_to_string(&output_path)?)?;
    assert_eq!(
        written,
        json!({
            "title": "Dashboard",
            "count": 3,
            "items": ["a", "b", "c"],
            "owner": {"name": "Ada", "email": "ada@example.com"},
            "created": {"$opaque": "Date", "data": "2024-05-01T00:00:00Z"},
            "selection": null
        })
    );
    Ok(())
}

#[test]
fn unwrap_ndjson_to_stdout() -> Result<(), Box<dyn Error>> {
    let output = dewrap()?
        .args(["unwrap", &fixture("events.ndjson")])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    assert_eq!(
        stdout_lines(&output)?,
        vec![
            json!({"id": 1, "tags": ["new"]}),
            json!({"id": 2, "tags": []}),
            json!({"id": 3, "tags": ["done", "archived"]}),
        ]
    );
    Ok(())
}

#[test]
fn unwrap_with_threads_keeps_order() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let input_path = dir.path().join("many.ndjson");
    let text: String = (0..200)
        .map(|i| format!("{{\"n\": {{\"$ref\": {}}}}}\n", i))
        .collect();
    fs::write(&input_path, text)?;

    let output = dewrap()?
        .args([
            "unwrap",
            input_path.to_str().unwrap(),
            "--threads",
            "4",
            "-q",
        ])
        .assert()
        .success()
        .stderr(predicate::str::is_empty())
        .get_output()
        .stdout
        .clone();

    let records = stdout_lines(&output)?;
    assert_eq!(records.len(), 200);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record, &json!({"n": i}));
    }
    Ok(())
}

#[test]
fn unwrap_only_selected_kinds() -> Result<(), Box<dyn Error>> {
    let output = dewrap()?
        .args(["unwrap", &fixture("events.ndjson"), "--only", "ref,reactive"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let records = stdout_lines(&output)?;
    assert_eq!(records[0], json!({"id": 1, "tags": [{"$proxy": "new"}]}));
    assert_eq!(records[2], json!({"id": 3, "tags": ["done", "archived"]}));
    Ok(())
}

#[test]
fn unwrap_rejects_unknown_kind() -> Result<(), Box<dyn Error>> {
    dewrap()?
        .args(["unwrap", &fixture("events.ndjson"), "--only", "signal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown wrapper kind"));
    Ok(())
}

#[test]
fn shape_mismatch_fails_without_skip() -> Result<(), Box<dyn Error>> {
    dewrap()?
        .args(["unwrap", &fixture("mixed.ndjson")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ShapeMismatch"));
    Ok(())
}

#[test]
fn skip_invalid_reports_rejected() -> Result<(), Box<dyn Error>> {
    let output = dewrap()?
        .args(["unwrap", &fixture("mixed.ndjson"), "--skip-invalid"])
        .assert()
        .success()
        .stderr(predicate::str::contains("rejected: 1"))
        .get_output()
        .stdout
        .clone();

    assert_eq!(
        stdout_lines(&output)?,
        vec![json!({"state": 1}), json!({"state": 2})]
    );
    Ok(())
}

#[test]
fn skip_invalid_single_document_leaves_output_empty() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let input_path = dir.path().join("scalar.json");
    let output_path = dir.path().join("out.json");
    fs::write(&input_path, r#"{"$ref": 5}"#)?;

    dewrap()?
        .args([
            "unwrap",
            input_path.to_str().unwrap(),
            "--skip-invalid",
            "-o",
            output_path.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("rejected: 1"));

    assert!(fs::read_to_string(&output_path)?.is_empty());
    Ok(())
}

#[test]
fn config_file_supplies_defaults() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("dewrap.toml");
    fs::write(&config_path, "skip_invalid = true\nonly = [\"ref\"]\n")?;

    let output = dewrap()?
        .args([
            "--config",
            config_path.to_str().unwrap(),
            "unwrap",
            &fixture("mixed.ndjson"),
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    assert_eq!(stdout_lines(&output)?.len(), 2);
    Ok(())
}

#[test]
fn invalid_config_is_reported() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("dewrap.toml");
    fs::write(&config_path, "thread = 2\n")?;

    dewrap()?
        .args([
            "unwrap",
            &fixture("plain.ndjson"),
            "--config",
            config_path.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
    Ok(())
}

#[test]
fn stats_flag_prints_wrapper_counts() -> Result<(), Box<dyn Error>> {
    dewrap()?
        .args(["unwrap", &fixture("events.ndjson"), "--stats"])
        .assert()
        .success()
        .stderr(predicate::str::contains("ref\t3"))
        .stderr(predicate::str::contains("proxy\t1"))
        .stderr(predicate::str::contains("reactive\t1"));
    Ok(())
}

#[test]
fn inspect_json_output_parses() -> Result<(), Box<dyn Error>> {
    let output = dewrap()?
        .args([
            "inspect",
            &fixture("component.json"),
            "--format",
            "json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: Value = serde_json::from_slice(&output)?;
    assert_eq!(value["records"], 1);
    assert_eq!(value["layout"], "single record");
    assert_eq!(value["wrappers"]["ref"], 3);
    assert_eq!(value["wrappers"]["reactive"], 2);
    assert_eq!(value["wrappers"]["proxy"], 2);
    assert_eq!(value["opaque_classes"]["Date"], 1);
    assert_eq!(value["max_layers"], 2);
    Ok(())
}

#[test]
fn inspect_table_lists_kinds() -> Result<(), Box<dyn Error>> {
    dewrap()?
        .args(["inspect", &fixture("events.ndjson")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Records:\t3"))
        .stdout(predicate::str::contains("Wrapper\tCount"));
    Ok(())
}

#[test]
fn check_fails_on_wrapper() -> Result<(), Box<dyn Error>> {
    dewrap()?
        .args(["check", &fixture("events.ndjson")])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("record 0 at /id"));
    Ok(())
}

#[test]
fn check_errors_exit_with_status_1() -> Result<(), Box<dyn Error>> {
    dewrap()?
        .args(["check", &fixture("component.json"), "--pointer", "/state"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());
    Ok(())
}

#[test]
fn check_names_root_wrapper() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let input_path = dir.path().join("root.json");
    fs::write(&input_path, r#"{"$ref": {}}"#)?;

    dewrap()?
        .args(["check", input_path.to_str().unwrap()])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("record 0 at <root>"));
    Ok(())
}

#[test]
fn check_passes_plain_input() -> Result<(), Box<dyn Error>> {
    dewrap()?
        .args(["check", &fixture("plain.ndjson")])
        .assert()
        .success()
        .stdout(predicate::str::contains("plain: 2 records"));
    Ok(())
}

#[test]
fn check_plain_output_of_unwrap() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let output_path = dir.path().join("plain.ndjson");

    dewrap()?
        .args([
            "unwrap",
            &fixture("events.ndjson"),
            "-o",
            output_path.to_str().unwrap(),
        ])
        .assert()
        .success();

    dewrap()?
        .args(["check", output_path.to_str().unwrap()])
        .assert()
        .success();
    Ok(())
}

#[test]
fn unwrap_reads_stdin() -> Result<(), Box<dyn Error>> {
    dewrap()?
        .args(["unwrap", "-", "--json", "--format", "ndjson"])
        .write_stdin(r#"{"$reactive": {"a": {"$ref": [1, {"$proxy": 2}]}}}"#)
        .assert()
        .success()
        .stdout("{\"a\":[1,2]}\n");
    Ok(())
}

#[test]
fn missing_pointer_names_available_keys() -> Result<(), Box<dyn Error>> {
    dewrap()?
        .args(["unwrap", &fixture("component.json"), "--pointer", "/state"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("meta, props"));
    Ok(())
}
