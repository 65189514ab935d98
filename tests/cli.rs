//! End-to-end tests for the docdrift binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn fixture(code: &str, docs: &str) -> (tempfile::TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let code_dir = dir.path().join("src");
    let docs_dir = dir.path().join("docs");
    std::fs::create_dir_all(&code_dir).unwrap();
    std::fs::create_dir_all(&docs_dir).unwrap();
    std::fs::write(code_dir.join("app.py"), code).unwrap();
    std::fs::write(docs_dir.join("api.md"), docs).unwrap();
    (dir, code_dir, docs_dir)
}

#[test]
fn prints_markdown_report_to_stdout() {
    let (_dir, code_dir, docs_dir) = fixture(
        r#"def documented_func():
    """Has docs."""
    return 1


def undocumented_func():
    return 2
"#,
        "## `documented_func()`\n\nDocumented helper.\n",
    );

    Command::cargo_bin("docdrift")
        .unwrap()
        .arg(&code_dir)
        .arg(&docs_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Documentation Drift Report"))
        .stdout(predicate::str::contains("undocumented_func"));
}

#[test]
fn fail_on_critical_sets_exit_code() {
    let (_dir, code_dir, docs_dir) = fixture(
        r#"def real_func():
    """Exists."""
    return 1
"#,
        "## `real_func()`\n\nReal helper.\n\n## `ghost_func()`\n\nRemoved long ago.\n",
    );

    Command::cargo_bin("docdrift")
        .unwrap()
        .arg(&code_dir)
        .arg(&docs_dir)
        .arg("--fail-on")
        .arg("critical")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ghost_func"));
}

#[test]
fn json_report_is_valid_json() {
    let (_dir, code_dir, docs_dir) = fixture(
        "def f():\n    \"\"\"Doc.\"\"\"\n    return 0\n",
        "## `f()`\n\nThe f function.\n",
    );

    let output = Command::cargo_bin("docdrift")
        .unwrap()
        .arg(&code_dir)
        .arg(&docs_dir)
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed["stats"]["total_functions"], 1);
}

#[test]
fn unknown_format_is_a_fatal_configuration_error() {
    let (_dir, code_dir, docs_dir) = fixture("def f():\n    return 0\n", "# Docs\n");

    Command::cargo_bin("docdrift")
        .unwrap()
        .arg(&code_dir)
        .arg(&docs_dir)
        .arg("--format")
        .arg("yaml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("yaml"));
}

#[test]
fn missing_code_path_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let docs_dir = dir.path().join("docs");
    std::fs::create_dir_all(&docs_dir).unwrap();

    Command::cargo_bin("docdrift")
        .unwrap()
        .arg(dir.path().join("nope"))
        .arg(&docs_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Code path does not exist"));
}
