//! CLI end-to-end tests
//!
//! Tests for the toolcrib command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the toolcrib binary with a clean deployment environment
#[allow(deprecated)]
fn toolcrib_cmd() -> Command {
    let mut cmd = Command::cargo_bin("toolcrib").unwrap();
    for var in [
        "ADMIN_PASSWORD",
        "SECRET_KEY",
        "UPLOAD_DIR",
        "DATA_DIR",
        "DATABASE_PATH",
        "PUBLIC_URL",
        "TOOLCRIB_CONFIG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_cli_no_args_shows_help() {
    toolcrib_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_lists_commands() {
    toolcrib_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("launch"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("check-env"));
}

#[test]
fn test_cli_version_command() {
    toolcrib_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_generate_secret() {
    let output = toolcrib_cmd().arg("generate-secret").output().unwrap();
    assert!(output.status.success());
    let secret = String::from_utf8(output.stdout).unwrap();
    assert_eq!(secret.trim().len(), 64);
}

#[test]
fn test_cli_validate_good_config() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("toolcrib.toml");
    fs::write(&path, "[server]\nport = 8080\n\n[launcher]\nadmin_password = \"s3cret\"\n").unwrap();

    toolcrib_cmd()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("8080"));
}

#[test]
fn test_cli_validate_bad_config() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("toolcrib.toml");
    fs::write(&path, "[server]\nport = 0\n").unwrap();

    toolcrib_cmd().arg("validate").arg(&path).assert().failure();
}

#[test]
fn test_cli_check_env_reports_missing() {
    let temp = tempdir().unwrap();
    toolcrib_cmd()
        .current_dir(temp.path())
        .args(["check-env", "--strict"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("✗ ADMIN_PASSWORD"));
}

#[test]
fn test_cli_check_env_complete() {
    let temp = tempdir().unwrap();
    toolcrib_cmd()
        .current_dir(temp.path())
        .env("ADMIN_PASSWORD", "s3cret")
        .env("SECRET_KEY", "abc")
        .args(["check-env", "--strict"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ SECRET_KEY"))
        .stdout(predicate::str::contains("toolcrib serve"));
}

#[test]
fn test_cli_provision_creates_storage() {
    let temp = tempdir().unwrap();
    toolcrib_cmd()
        .current_dir(temp.path())
        .env("DATA_DIR", temp.path().join("data"))
        .arg("provision")
        .assert()
        .success()
        .stdout(predicate::str::contains("Schema version"));

    assert!(temp.path().join("data/toolcrib.db").exists());
    assert!(temp.path().join("data/uploads").is_dir());
}

#[test]
fn test_cli_launch_without_manifest_fails() {
    let temp = tempdir().unwrap();
    toolcrib_cmd()
        .current_dir(temp.path())
        .args(["launch", "--no-pause"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid launch manifest"));

    assert!(temp.path().join(".toolcrib").is_dir());
    assert!(!temp.path().join(".toolcrib/toolcrib.db").exists());
}
