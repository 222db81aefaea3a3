//! CLI-level tests: startup failure exit codes and read-only commands

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn rw() -> Command {
    Command::cargo_bin("rw").expect("binary builds")
}

#[test]
fn test_missing_explicit_config_is_fatal() {
    rw().args(["--config", "/nonexistent/repowatch.yml", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_non_repository_path_is_fatal() {
    let temp = tempdir().unwrap();

    let config = format!("repository:\n  path: {}\n", temp.path().display());
    let config_path = temp.path().join("repowatch.yml");
    fs::write(&config_path, config).unwrap();

    rw().args(["--config", &config_path.to_string_lossy(), "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a git repository"));
}

#[test]
fn test_missing_git_binary_is_fatal() {
    let temp = tempdir().unwrap();
    // validate() only needs the .git marker; the probe then fails on PATH
    fs::create_dir_all(temp.path().join(".git")).unwrap();

    let config = format!("repository:\n  path: {}\n", temp.path().display());
    let config_path = temp.path().join("repowatch.yml");
    fs::write(&config_path, config).unwrap();

    rw().args(["--config", &config_path.to_string_lossy(), "check"])
        .env("PATH", "")
        .assert()
        .failure()
        .stderr(predicate::str::contains("'git' not found"));
}

#[test]
fn test_fingerprint_prints_hash() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("data.txt");
    fs::write(&file, "a").unwrap();

    rw().args(["fingerprint", &file.to_string_lossy()])
        .assert()
        .success()
        .stdout(predicate::str::is_match("^[0-9a-f]{64}\n$").unwrap());
}

#[test]
fn test_fingerprint_absent_target() {
    let temp = tempdir().unwrap();
    let missing = temp.path().join("missing");

    rw().args(["fingerprint", &missing.to_string_lossy()])
        .assert()
        .success()
        .stdout(predicate::str::contains("target absent"));
}

#[test]
fn test_fingerprint_json_output() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("data.txt");
    fs::write(&file, "a").unwrap();

    rw().args(["fingerprint", &file.to_string_lossy(), "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"fingerprint\""));
}

#[test]
fn test_check_reports_baseline_in_json() {
    let temp = tempdir().unwrap();

    let run = |args: &[&str]| {
        std::process::Command::new("git")
            .args(args)
            .current_dir(temp.path())
            .output()
            .expect("git runs");
    };
    run(&["init"]);
    run(&["config", "user.email", "test@test.com"]);
    run(&["config", "user.name", "Test"]);

    fs::write(temp.path().join("data.txt"), "a").unwrap();
    let config = format!("repository:\n  path: {}\nwatch:\n  target: data.txt\n", temp.path().display());
    let config_path = temp.path().join("repowatch.yml");
    fs::write(&config_path, config).unwrap();

    rw().args(["--config", &config_path.to_string_lossy(), "check", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"outcome\": \"baseline\""));
}
