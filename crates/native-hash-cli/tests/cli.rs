// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Integration tests for the `native-hash-updater` binary.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn seed(dir: &Path) {
    fs::write(
        dir.join("b10-b11.txt"),
        "{ 0x4EDE34FBADD967A6, 0x0102030405060708 }\n",
    )
    .unwrap();
    fs::write(
        dir.join("natives.json"),
        r#"{ "SYSTEM": { "0x4EDE34FBADD967A6": { "name": "WAIT" } } }"#,
    )
    .unwrap();
    fs::write(
        dir.join("natives.h"),
        "\tstatic void WAIT(int ms) { invoke<Void>(0x4EDE34FBADD967A6, ms); }\n",
    )
    .unwrap();
}

#[test]
fn run_with_flags_writes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let out = dir.path().join("out");

    Command::cargo_bin("native-hash-updater")
        .unwrap()
        .arg("b10-b11.txt")
        .arg("--input-dir")
        .arg(dir.path())
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(out.join("natives-b11.h")).unwrap(),
        "\tstatic void WAIT(int ms) { invoke<Void>(0x0102030405060708, ms); }\n"
    );
    assert_eq!(
        fs::read_to_string(out.join("crossmap.txt")).unwrap(),
        "{0x4EDE34FBADD967A6, 0x0102030405060708},\n"
    );
    assert!(out.join("x64natives.dat").is_file());
    assert!(out.join("HashMapData.h").is_file());
    assert!(out.join("native_translation.dat").is_file());
}

#[test]
fn run_with_config_file() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let config = serde_config(dir.path());
    fs::write(dir.path().join("updater.json"), config).unwrap();

    Command::cargo_bin("native-hash-updater")
        .unwrap()
        .arg("--config")
        .arg(dir.path().join("updater.json"))
        .assert()
        .success();

    assert!(dir.path().join("cfg-out").join("renames.txt").is_file());
}

fn serde_config(root: &Path) -> String {
    format!(
        r#"{{
            "diff_files": ["b10-b11.txt"],
            "input_dir": {root:?},
            "output_dir": {out:?},
            "outputs": {{ "crossmap": "renames.txt" }}
        }}"#,
        root = root.display().to_string(),
        out = root.join("cfg-out").display().to_string(),
    )
}

#[test]
fn missing_catalog_fails() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    fs::remove_file(dir.path().join("natives.json")).unwrap();

    Command::cargo_bin("native-hash-updater")
        .unwrap()
        .arg("b10-b11.txt")
        .arg("--input-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("MISSING_INPUT_FILE"));
}

#[test]
fn malformed_diff_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    fs::write(dir.path().join("b10-b11.txt"), "0x1 -> 0x2\n").unwrap();

    Command::cargo_bin("native-hash-updater")
        .unwrap()
        .arg("b10-b11.txt")
        .arg("--input-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("MALFORMED_DIFF_LINE"));
}
