//! End-to-end tests for `voronconf generate`.

use serde_json::Value;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

mod fixtures;
use fixtures::*;

/// Path to the voronconf binary
fn voronconf_bin() -> &'static str {
    env!("CARGO_BIN_EXE_voronconf")
}

/// Runs the binary with an isolated, empty config directory.
fn run(args: &[&str], config_dir: &Path) -> Output {
    Command::new(voronconf_bin())
        .env("VORONCONF_CONFIG_DIR", config_dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_generate_to_stdout() {
    let config_dir = TempDir::new().unwrap();
    let output = run(&["generate", "--printer", "voron2.4", "--deterministic"], config_dir.path());

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.starts_with("## Voron 2.4"));
    assert!(text.contains("[quad_gantry_level]"));
    assert!(text.contains("## Generated at: 1970-01-01T00:00:00+00:00"));
}

#[test]
fn test_generate_deterministic_output_is_stable() {
    let config_dir = TempDir::new().unwrap();
    let args = ["generate", "--printer", "trident", "--board", "octopus_pro", "--deterministic"];
    let first = run(&args, config_dir.path());
    let second = run(&args, config_dir.path());
    assert_eq!(first.status.code(), Some(0));
    assert_eq!(stdout(&first), stdout(&second));
}

#[test]
fn test_generate_writes_into_directory() {
    let config_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    let output = run(
        &["generate", "--out", out_dir.path().to_str().unwrap()],
        config_dir.path(),
    );

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let written = std::fs::read_to_string(out_dir.path().join("printer.cfg"))
        .expect("printer.cfg should be written");
    assert!(written.contains("[mcu]"));
    assert!(stdout(&output).contains("✓ Generated"));
}

#[test]
fn test_generate_uses_configured_filename() {
    let config_dir = TempDir::new().unwrap();
    std::fs::write(
        config_dir.path().join("config.toml"),
        "[output]\nfilename = \"voron.cfg\"\n",
    )
    .unwrap();
    let out_dir = TempDir::new().unwrap();

    let output = run(
        &["generate", "--out", out_dir.path().to_str().unwrap()],
        config_dir.path(),
    );
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(out_dir.path().join("voron.cfg").exists());
}

#[test]
fn test_generate_json_response() {
    let config_dir = TempDir::new().unwrap();
    let output = run(&["generate", "--json", "--toolhead", "ebb36"], config_dir.path());

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let response: Value = serde_json::from_str(&stdout(&output)).expect("valid JSON");
    assert_eq!(response["success"], true);
    assert_eq!(response["filename"], "printer.cfg");
    assert_eq!(response["metadata"]["toolheadBoard"], "BTT EBB36 (RP2040)");
    assert!(response["config"].as_str().unwrap().contains("canbus_uuid"));
}

#[test]
fn test_generate_from_request_file() {
    let config_dir = TempDir::new().unwrap();
    let (request, _guard) = write_request_file(&trident_request());
    let output = run(
        &["generate", "--request", request.to_str().unwrap()],
        config_dir.path(),
    );

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("[z_tilt]"));
    // "switch" falls back to the default probe
    assert!(stderr(&output).contains("probe: 'switch'"));
}

#[test]
fn test_generate_unknown_key_still_succeeds() {
    let config_dir = TempDir::new().unwrap();
    let output = run(&["generate", "--board", "nope"], config_dir.path());
    assert_eq!(output.status.code(), Some(0));
    assert!(stderr(&output).contains("control_board: 'nope'"));
}

#[test]
fn test_generate_strict_rejects_placeholders() {
    let config_dir = TempDir::new().unwrap();
    let output = run(&["generate", "--strict"], config_dir.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("serial"));
}

#[test]
fn test_generate_invalid_request_file() {
    let config_dir = TempDir::new().unwrap();
    let request = config_dir.path().join("bad.json");
    std::fs::write(&request, "{").unwrap();
    let output = run(
        &["generate", "--request", request.to_str().unwrap()],
        config_dir.path(),
    );
    assert_eq!(output.status.code(), Some(1));

    let output = run(&["generate", "--request", "/nonexistent/request.json"], config_dir.path());
    assert_eq!(output.status.code(), Some(2));
}
