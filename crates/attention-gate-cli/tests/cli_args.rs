//! CLI argument validation tests.
//!
//! Tests command-line argument parsing, validation, and error handling.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use assert_cmd::Command;
use predicates::prelude::*;

fn attention_gate(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("attention-gate").unwrap();
    cmd.current_dir(dir).env("XDG_CONFIG_HOME", dir.join("xdg"));
    cmd
}

#[test]
fn test_help_lists_commands() {
    let temp_dir = tempfile::tempdir().unwrap();
    attention_gate(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("serve")
                .and(predicate::str::contains("calibrate"))
                .and(predicate::str::contains("console"))
                .and(predicate::str::contains("thresholds")),
        );
}

#[test]
fn test_missing_subcommand_is_usage_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    attention_gate(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_serve_requires_landmark_source() {
    let temp_dir = tempfile::tempdir().unwrap();
    attention_gate(temp_dir.path())
        .arg("serve")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No landmark source"));
}

#[test]
fn test_calibrate_requires_landmark_source() {
    let temp_dir = tempfile::tempdir().unwrap();
    attention_gate(temp_dir.path())
        .arg("calibrate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--landmarks"));
}

#[test]
fn test_unknown_event_format_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    attention_gate(temp_dir.path())
        .args(["serve", "--landmarks", "x.jsonl", "--events", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'xml'"));
}

#[test]
fn test_invalid_port_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    attention_gate(temp_dir.path())
        .args(["serve", "--landmarks", "x.jsonl", "--port", "70000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("70000"));
}

#[test]
fn test_missing_recording_reported() {
    let temp_dir = tempfile::tempdir().unwrap();
    attention_gate(temp_dir.path())
        .args(["calibrate", "--landmarks", "missing.jsonl"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("missing.jsonl"));
}
