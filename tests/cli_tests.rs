use std::fs;
use std::process::Command;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("arena-sync.toml");
    fs::write(&path, contents).expect("write temp config");
    path
}

fn bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_arena-sync"));
    cmd.env_remove("ARENA_SYNC_CONFIG")
        .env_remove("SYNC_SECRET")
        .env_remove("CRON_SECRET")
        .env_remove("EDGE_API_TOKEN")
        .env("RUST_LOG", "warn");
    cmd
}

#[test]
fn help_lists_subcommands() {
    cargo_bin_cmd!("arena-sync")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn invalid_config_exits_nonzero_naming_the_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[upstream]\nmax_retries = 0\n");

    let output = bin()
        .args(["status", "--config"])
        .arg(&path)
        .output()
        .expect("run arena-sync");

    assert!(!output.status.success(), "Expected nonzero exit code");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("upstream.max_retries"), "stderr: {stderr}");
}

#[test]
fn status_on_fresh_database_prints_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("fresh.db");

    let output = bin()
        .arg("--database")
        .arg(&db)
        .arg("status")
        .output()
        .expect("run arena-sync");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "[]");
    assert!(db.exists());
}

#[test]
fn unknown_category_is_rejected_by_the_parser() {
    cargo_bin_cmd!("arena-sync")
        .args(["sync", "--category", "positions"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown category"));
}

#[test]
fn unreachable_upstream_fails_the_category_not_the_command() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("sync.db");
    let path = write_config(
        &dir,
        &format!(
            "database = {:?}\n\n[upstream]\nbase_url = \"http://127.0.0.1:9/api\"\ntimeout_ms = 500\nmax_retries = 1\n",
            db.to_str().unwrap()
        ),
    );

    let output = bin()
        .args(["sync", "--category", "prices", "--force", "--config"])
        .arg(&path)
        .output()
        .expect("run arena-sync");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["success"], true);
    assert_eq!(summary["categories"][0]["category"], "prices");
    assert_eq!(summary["categories"][0]["status"], "failed");
    assert_eq!(summary["totals"]["categories_failed"], 1);
}
