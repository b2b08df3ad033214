//! CLI behavior that needs no catalog server.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn quiver_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_quiver"))
}

fn run_cli(home: &Path, args: &[&str]) -> Output {
    Command::new(quiver_bin())
        .args(args)
        .env("QUIVER_HOME", home)
        .env_remove("QUIVER_API_URL")
        .env_remove("QUIVER_API_KEY")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute quiver CLI")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn json_error(output: &Output) -> String {
    assert!(
        !output.status.success(),
        "command unexpectedly succeeded\nstdout:\n{}\nstderr:\n{}",
        stdout(output),
        String::from_utf8_lossy(&output.stderr)
    );
    let value: serde_json::Value =
        serde_json::from_str(stdout(output).trim()).expect("error output is JSON");
    value["error"].as_str().expect("error field").to_string()
}

#[test]
fn test_favorite_toggles_and_persists() {
    let home = TempDir::new().unwrap();

    let first = run_cli(home.path(), &["favorite", "asset-1"]);
    assert!(first.status.success());
    assert!(stdout(&first).contains("Added asset-1"));

    let prefs = fs::read_to_string(home.path().join("preferences.json")).unwrap();
    assert!(prefs.contains("asset-1"));

    let second = run_cli(home.path(), &["favorite", "asset-1"]);
    assert!(second.status.success());
    assert!(stdout(&second).contains("Removed asset-1"));
}

#[test]
fn test_invalid_config_reports_json_error() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("custom.toml");
    fs::write(&config, "page_limit = 0\n").unwrap();

    let output = run_cli(
        home.path(),
        &["--config", config.to_str().unwrap(), "sync", "--json"],
    );
    let error = json_error(&output);
    assert!(error.contains("Invalid configuration"), "{}", error);
    assert!(error.contains("page_limit"), "{}", error);
}

#[test]
fn test_unreachable_catalog_fails_cleanly() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("config.toml"), "request_timeout_secs = 2\n").unwrap();

    let output = run_cli(
        home.path(),
        &["--api-url", "http://127.0.0.1:9/v1", "folders", "--json"],
    );
    let error = json_error(&output);
    assert!(error.contains("Catalog sync failed"), "{}", error);
    assert!(home.path().join("logs").join("quiver.log").exists());
}
