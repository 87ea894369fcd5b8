//! Command-line surface tests
//!
//! These never reach a backend: they cover argument parsing, completions and
//! the failures that happen before the first request.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const SHARDFS_VARS: &[&str] = &[
    "SHARDFS_CONFIG",
    "SHARDFS_ACCOUNT",
    "SHARDFS_APP",
    "SHARDFS_BASE_PATH",
    "SHARDFS_URL",
    "SHARDFS_USER",
    "SHARDFS_KEY_ID",
    "SHARDFS_KEY",
    "SHARDFS_KEY64",
    "SHARDFS_KEY_STORE",
];

#[allow(deprecated)]
fn shardfs() -> Command {
    let mut cmd = Command::cargo_bin("shardfs").unwrap();
    for var in SHARDFS_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_help_lists_commands() {
    shardfs()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("mkdir")
                .and(predicate::str::contains("upload"))
                .and(predicate::str::contains("--account")),
        );
}

#[test]
fn test_completions() {
    shardfs()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shardfs"));
}

#[test]
fn test_missing_configuration() {
    shardfs()
        .args(["ls", "--account", "AB12CD34", "--app", "notes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SHARDFS_* environment is incomplete"));
}

#[test]
fn test_invalid_configuration_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("shardfs.toml");
    fs::write(&config, "basePath = \"relative/path\"\n").unwrap();

    shardfs()
        .arg("--config")
        .arg(&config)
        .args(["ls", "--account", "AB12CD34", "--app", "notes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("basePath"));
}

#[test]
fn test_unparseable_key_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("shardfs.json");
    fs::write(
        &config,
        r#"{
  "basePath": "/alice/stor",
  "url": "http://127.0.0.1:9",
  "user": "alice",
  "keyId": "fp",
  "key": "not a pem key"
}"#,
    )
    .unwrap();

    shardfs()
        .arg("--config")
        .arg(&config)
        .args(["-q", "ls", "--account", "AB12CD34", "--app", "notes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid key material"));
}

#[test]
fn test_missing_tenant() {
    let dir = TempDir::new().unwrap();
    let key = dir.path().join("id_rsa");
    fs::write(&key, include_str!("../../shardfs-storage/tests/fixtures/test_key.pem")).unwrap();
    let config = dir.path().join("shardfs.yaml");
    fs::write(
        &config,
        format!(
            "basePath: /alice/stor\nurl: http://127.0.0.1:9\nuser: alice\nkeyId: fp\nkeyStore: {}\n",
            key.display()
        ),
    )
    .unwrap();

    shardfs()
        .arg("--config")
        .arg(&config)
        .args(["-q", "ls", "--app", "notes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--account"));
}
