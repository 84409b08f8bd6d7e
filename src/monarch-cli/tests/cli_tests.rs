//! Binary-level tests for monarch-auth.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const GOOD_GITIGNORE: &str =
    ".env\n.env.*\n!.env.example\n*.pickle\n.mm/\n*session*.json\n*token*.json\n*.session\n";

/// A command isolated from the caller's environment and `.env`.
fn monarch_auth(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("monarch-auth").unwrap();
    cmd.current_dir(cwd)
        .env("NO_COLOR", "1")
        .env_remove("MONARCH_LOG_LEVEL")
        .env_remove("MONARCH_EMAIL")
        // Nothing listens here; diagnose never gets far enough to call it.
        .env("MONARCH_API_URL", "http://127.0.0.1:9");
    cmd
}

fn write(dir: &Path, path: &str, contents: &str) {
    let full = dir.join(path);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(full, contents).unwrap();
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    monarch_auth(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("diagnose"))
        .stdout(predicate::str::contains("audit"))
        .stdout(predicate::str::contains("MONARCH_API_URL"))
        .stdout(predicate::str::contains("memory-store").not());
}

#[test]
fn test_audit_clean_tree_succeeds() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), ".gitignore", GOOD_GITIGNORE);
    write(dir.path(), ".env", "MONARCH_EMAIL=me@example.com\n");
    write(dir.path(), ".env.example", "MONARCH_EMAIL=\n");

    monarch_auth(dir.path())
        .args(["audit", ".", "--no-git"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Safe to publish"));
}

#[test]
fn test_audit_without_gitignore_fails() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "token.json", "{}");

    monarch_auth(dir.path())
        .args(["audit", "--no-git"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No .gitignore"))
        .stderr(predicate::str::contains("token.json"));
}

#[test]
fn test_audit_json_output() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), ".gitignore", ".env\n");
    write(dir.path(), "session.pickle", "x");

    let output = monarch_auth(dir.path())
        .args(["audit", "--json", "--no-git"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let codes: Vec<&str> = json["findings"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["code"].as_str())
        .collect();
    assert!(codes.contains(&"unignored_probe"));
    assert!(codes.contains(&"publishable_secret"));
}

#[test]
fn test_audit_missing_directory_errors() {
    let dir = TempDir::new().unwrap();
    monarch_auth(dir.path())
        .args(["audit", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a directory"));
}

#[test]
fn test_status_without_token() {
    let dir = TempDir::new().unwrap();
    monarch_auth(dir.path())
        .args(["--memory-store", "status"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_logout_without_token() {
    let dir = TempDir::new().unwrap();
    monarch_auth(dir.path())
        .args(["--memory-store", "logout", "--yes"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_diagnose_without_token_recommends_login() {
    let dir = TempDir::new().unwrap();
    let output = monarch_auth(dir.path())
        .args(["--memory-store", "diagnose", "--json", "--no-prompt"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["recommendation"], "login");
    assert_eq!(json["presence"]["state"], "missing");
    assert_eq!(json["healthy"], false);
    assert!(json.get("connectivity").is_none());
}

#[test]
fn test_login_needs_terminal() {
    let dir = TempDir::new().unwrap();
    monarch_auth(dir.path())
        .args(["--memory-store", "login"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("interactive terminal"));
}
