//! CLI integration tests
//!
//! Tests the mktmpio CLI using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;

fn mktmpio() -> Command {
    let mut cmd = Command::cargo_bin("mktmpio")
        .expect("Failed to locate mktmpio binary - ensure it's built before running tests");
    cmd.env_remove("MKTMPIO_TOKEN")
        .env_remove("MKTMPIO_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    mktmpio()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("mktmpio"))
        .stdout(predicate::str::contains("temporary database servers"));
}

#[test]
fn test_cli_version() {
    mktmpio()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mktmpio"));
}

#[test]
fn test_cli_create_help() {
    mktmpio()
        .args(["create", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--env"));
}

#[test]
fn test_cli_attach_help() {
    mktmpio()
        .args(["attach", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shell"));
}

#[test]
fn test_cli_unknown_command() {
    mktmpio()
        .arg("nonexistent-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_cli_destroy_requires_ids() {
    mktmpio().arg("destroy").assert().failure();
}

#[test]
fn test_cli_config_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    mktmpio()
        .arg("-c")
        .arg(&path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_cli_config_set_then_get() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    mktmpio()
        .arg("-c")
        .arg(&path)
        .args(["config", "set", "url", "http://localhost:3000/api/v1"])
        .assert()
        .success();

    mktmpio()
        .arg("-c")
        .arg(&path)
        .args(["config", "get", "url"])
        .assert()
        .success()
        .stdout("http://localhost:3000/api/v1\n");
}

#[test]
fn test_cli_env_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "url = \"http://from-file\"\n").unwrap();

    mktmpio()
        .env("MKTMPIO_URL", "http://from-env")
        .arg("-c")
        .arg(&path)
        .args(["config", "get", "url"])
        .assert()
        .success()
        .stdout("http://from-env\n");
}

#[test]
fn test_cli_config_show_masks_token() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    mktmpio()
        .arg("-c")
        .arg(&path)
        .args(["config", "set", "token", "1234-5678-90abcdef"])
        .assert()
        .success();

    mktmpio()
        .arg("-c")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cdef"))
        .stdout(predicate::str::contains("1234-5678").not());
}

#[test]
fn test_cli_config_get_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    mktmpio()
        .arg("-c")
        .arg(dir.path().join("config.toml"))
        .args(["config", "get", "colour"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn test_cli_create_without_token() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "url = \"http://127.0.0.1:9\"\n").unwrap();

    mktmpio()
        .arg("-c")
        .arg(&path)
        .args(["create", "redis"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No API token configured"));
}

#[test]
fn test_cli_create_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    mktmpio()
        .arg("-c")
        .arg(dir.path().join("missing.toml"))
        .args(["--token", "abcdefg", "create", "redis"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}
