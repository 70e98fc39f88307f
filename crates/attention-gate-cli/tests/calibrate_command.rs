//! End-to-end calibration through the terminal prompt.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use attention_gate_test_support::{calibration_frames, write_jsonl};
use predicates::prelude::*;

const FAST_CALIBRATION: &str = r"
[calibration]
samples_per_step = 3
sample_interval_ms = 0
settle_ms = 0

[capture]
landmarks = 'poses.jsonl'
";

fn project(dir: &Path) -> Command {
    fs::write(dir.join(".attention-gate.toml"), FAST_CALIBRATION).unwrap();
    write_jsonl(&dir.join("poses.jsonl"), &calibration_frames(3)).unwrap();

    let mut cmd = Command::cargo_bin("attention-gate").unwrap();
    cmd.current_dir(dir).env("XDG_CONFIG_HOME", dir.join("xdg"));
    cmd
}

fn close(actual: &serde_json::Value, expected: f64) -> bool {
    (actual.as_f64().unwrap() - expected).abs() < 1e-9
}

#[test]
fn test_calibration_writes_thresholds() {
    let temp_dir = tempfile::tempdir().unwrap();

    project(temp_dir.path())
        .arg("calibrate")
        .write_stdin("\n".repeat(8))
        .assert()
        .success()
        .stderr(predicate::str::contains("Thresholds written to"));

    let written = fs::read_to_string(temp_dir.path().join("attention_thresholds.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert!(close(&json["EYE_HORIZONTAL_LEFT"], 0.2));
    assert!(close(&json["EYE_HORIZONTAL_RIGHT"], 0.8));
    assert!(close(&json["EYE_VERTICAL_UP"], 0.2));
    assert!(close(&json["EYE_VERTICAL_DOWN"], 0.8));
    assert!(close(&json["FACE_HORIZONTAL_LEFT"], 0.3));
    assert!(close(&json["FACE_HORIZONTAL_RIGHT"], 0.7));
    assert!(close(&json["FACE_VERTICAL_UP"], 0.25));
    assert!(close(&json["FACE_VERTICAL_DOWN"], 0.75));
}

#[test]
fn test_output_flag_chooses_file() {
    let temp_dir = tempfile::tempdir().unwrap();

    project(temp_dir.path())
        .args(["calibrate", "--output", "profiles/me.json"])
        .write_stdin("\n".repeat(8))
        .assert()
        .success();

    assert!(temp_dir.path().join("profiles/me.json").exists());
    assert!(!temp_dir.path().join("attention_thresholds.json").exists());
}

#[test]
fn test_abort_exits_3_and_keeps_existing_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let existing = temp_dir.path().join("attention_thresholds.json");
    fs::write(&existing, "previous").unwrap();

    project(temp_dir.path())
        .arg("calibrate")
        .write_stdin("\n\nq\n")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Calibration aborted"));

    assert_eq!(fs::read_to_string(&existing).unwrap(), "previous");
}

#[test]
fn test_closed_stdin_aborts() {
    let temp_dir = tempfile::tempdir().unwrap();

    project(temp_dir.path())
        .arg("calibrate")
        .write_stdin("\n")
        .assert()
        .code(3);

    assert!(!temp_dir.path().join("attention_thresholds.json").exists());
}

#[test]
fn test_short_recording_is_an_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut cmd = project(temp_dir.path());
    write_jsonl(&temp_dir.path().join("poses.jsonl"), &calibration_frames(3)[..5]).unwrap();

    cmd.arg("calibrate")
        .write_stdin("\n".repeat(8))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("landmark stream ended"));
}
