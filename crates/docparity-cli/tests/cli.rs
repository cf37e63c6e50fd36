//! Integration tests for CLI commands.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::cargo_bin("docparity").unwrap()
}

fn dirs_with(files: &[(&str, Option<&str>, Option<&str>)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("dump")).unwrap();
    fs::create_dir(temp.path().join("gt")).unwrap();
    for (name, dump, truth) in files {
        if let Some(dump) = dump {
            fs::write(temp.path().join("dump").join(name), dump).unwrap();
        }
        if let Some(truth) = truth {
            fs::write(temp.path().join("gt").join(name), truth).unwrap();
        }
    }
    temp
}

fn reconcile(root: &Path, dump: &str, truth: &str) -> Command {
    let mut command = cmd();
    command
        .arg("reconcile")
        .arg(root.join(dump))
        .arg(root.join(truth));
    command
}

#[test]
fn reconcile_without_arguments_prints_usage() {
    cmd()
        .arg("reconcile")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn reconcile_missing_dump_directory_fails() {
    let temp = dirs_with(&[]);
    reconcile(temp.path(), "absent", "gt")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Dump directory not found"));
}

#[test]
fn reconcile_missing_ground_truth_directory_fails() {
    let temp = dirs_with(&[]);
    reconcile(temp.path(), "dump", "absent")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Ground truth directory not found"));
}

#[test]
fn reconcile_reports_each_outcome() {
    let temp = dirs_with(&[
        ("a.py.json", Some(r#"{"v": 1.0001}"#), Some(r#"{"v": 1.0}"#)),
        ("b.py.json", Some("{broken"), Some("{}")),
        ("c.py.json", Some("[1]"), None),
        ("d.py.json", Some("[2.5]"), Some("[\n  2.5\n]\n")),
    ]);

    reconcile(temp.path(), "dump", "gt")
        .assert()
        .success()
        .stdout(predicate::str::contains("UPDATED: a.py.json"))
        .stdout(predicate::str::contains("ERROR: b.py.json: "))
        .stdout(predicate::str::contains(
            "SKIP: c.py.json (no matching ground truth file)",
        ))
        .stdout(predicate::str::contains("d.py.json").not())
        .stdout(predicate::str::ends_with(
            "\nDone: 1 updated, 1 unchanged, 1 errors\n",
        ));

    assert_eq!(
        fs::read_to_string(temp.path().join("gt/a.py.json")).unwrap(),
        "{\n  \"v\": 1.0\n}"
    );
}

#[test]
fn reconcile_strict_fails_on_errors() {
    let temp = dirs_with(&[("a.py.json", Some("nope"), Some("{}"))]);
    reconcile(temp.path(), "dump", "gt")
        .arg("--strict")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("1 file(s) failed to reconcile"));
}

#[test]
fn reconcile_check_does_not_write() {
    let temp = dirs_with(&[("a.py.json", Some("[1.23456]"), Some("[]"))]);
    reconcile(temp.path(), "dump", "gt")
        .args(["--check", "--strict"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("WOULD UPDATE: a.py.json"))
        .stderr(predicate::str::contains("out of date"));

    assert_eq!(fs::read_to_string(temp.path().join("gt/a.py.json")).unwrap(), "[]");
}

#[test]
fn reconcile_json_report() {
    let temp = dirs_with(&[("a.py.json", Some("[1.23456]"), Some("[]"))]);
    let output = reconcile(temp.path(), "dump", "gt")
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["tally"]["updated"], 1);
    assert_eq!(report["files"][0]["name"], "a.py.json");
    assert_eq!(report["files"][0]["outcome"], "updated");
}

#[test]
fn round_reads_stdin() {
    cmd()
        .arg("round")
        .write_stdin(r#"{"x": 1.23456, "n": 5, "s": "é"}"#)
        .assert()
        .success()
        .stdout("{\n  \"x\": 1.235,\n  \"n\": 5,\n  \"s\": \"\\u00e9\"\n}\n");
}

#[test]
fn round_keeps_integers_and_non_finite_values() {
    cmd()
        .arg("round")
        .write_stdin("[-0, 123456789012345678901234567890, NaN, -1e999, 0.0004]")
        .assert()
        .success()
        .stdout("[\n  0,\n  123456789012345678901234567890,\n  NaN,\n  -Infinity,\n  0.0\n]\n");
}

#[test]
fn round_honours_precision() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in.json");
    fs::write(&input, "[0.125, 0.375]").unwrap();
    cmd()
        .args(["round", input.to_str().unwrap(), "--precision", "2"])
        .assert()
        .success()
        .stdout("[\n  0.12,\n  0.38\n]\n");
}

#[test]
fn extract_writes_outputs() {
    let temp = TempDir::new().unwrap();
    let document = temp.path().join("doc.json");
    fs::write(
        &document,
        r#"{"pages": [{"char_cells": [{"rgba": {"r": 1, "g": 2, "b": 3, "a": 255}}],
                       "word_cells": [], "textline_cells": [{"text": "hello"}]}]}"#,
    )
    .unwrap();
    let out = temp.path().join("out");

    cmd()
        .args([
            "extract",
            document.to_str().unwrap(),
            out.to_str().unwrap(),
            "--tag",
            "cli",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""colors": {"rgba(1,2,3,255)": 1}"#));

    assert_eq!(
        fs::read_to_string(out.join("doc.cli.md")).unwrap(),
        "--- Page 1 ---\nhello\n"
    );
    assert!(out.join("doc.cli.stats.json").exists());
}

#[test]
fn extract_rejects_unknown_log_level() {
    cmd()
        .args(["extract", "doc.json", "out", "--log-level", "chatty"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown log level"));
}
