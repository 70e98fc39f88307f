//! Integration tests for configuration layering.
//!
//! Tests the full priority chain: hardcoded defaults < XDG config < project config < CLI args

#![allow(clippy::unwrap_used)] // Test code uses unwrap for brevity
#![allow(deprecated)] // cargo_bin deprecation warning

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn write_xdg(dir: &Path, content: &str) {
    let xdg = dir.join("xdg").join("attention-gate");
    fs::create_dir_all(&xdg).unwrap();
    fs::write(xdg.join("config.toml"), content).unwrap();
}

fn thresholds_path(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("attention-gate").unwrap();
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .args(["thresholds", "path"]);
    cmd
}

#[test]
fn test_default_thresholds_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    thresholds_path(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::diff("attention_thresholds.json\n"));
}

#[test]
fn test_xdg_config_applies() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_xdg(
        temp_dir.path(),
        r"
[thresholds]
file = 'from-xdg.json'
",
    );

    thresholds_path(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::diff("from-xdg.json\n"));
}

#[test]
fn test_project_config_overrides_xdg() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_xdg(
        temp_dir.path(),
        r"
[thresholds]
file = 'from-xdg.json'
",
    );
    fs::write(
        temp_dir.path().join(".attention-gate.toml"),
        r"
[thresholds]
file = 'from-project.json'
",
    )
    .unwrap();

    thresholds_path(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::diff("from-project.json\n"));
}

#[test]
fn test_project_config_found_from_subdirectory() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join(".attention-gate.toml"),
        r"
[thresholds]
file = 'from-project.json'
",
    )
    .unwrap();
    let nested = temp_dir.path().join("a").join("b");
    fs::create_dir_all(&nested).unwrap();

    let mut cmd = Command::cargo_bin("attention-gate").unwrap();
    cmd.current_dir(&nested)
        .env("XDG_CONFIG_HOME", temp_dir.path().join("xdg"))
        .args(["thresholds", "path"])
        .assert()
        .success()
        .stdout(predicate::str::diff("from-project.json\n"));
}

#[test]
fn test_cli_overrides_project_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join(".attention-gate.toml"),
        r"
[thresholds]
file = 'from-project.json'
",
    )
    .unwrap();

    thresholds_path(temp_dir.path())
        .args(["--file", "from-cli.json"])
        .assert()
        .success()
        .stdout(predicate::str::diff("from-cli.json\n"));
}

#[test]
fn test_unparseable_project_config_falls_back() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join(".attention-gate.toml"), "[thresholds\nfile = 1").unwrap();

    thresholds_path(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::diff("attention_thresholds.json\n"))
        .stderr(predicate::str::contains("Failed to parse config file"));
}

#[test]
fn test_out_of_range_value_warns() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join(".attention-gate.toml"),
        r"
[debounce]
window = 0
",
    )
    .unwrap();

    thresholds_path(temp_dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: debounce.window must be at least 1"));
}
