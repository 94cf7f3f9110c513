//! Shared test fixtures for integration tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;
use voronconf::catalog::Registry;
use voronconf::models::{ConfigurationDocument, RawSelection};
use voronconf::services::compile;

/// Loads the embedded catalog.
pub fn registry() -> Registry {
    Registry::load().expect("embedded catalog should load")
}

/// Request body from the first end-to-end scenario.
pub fn voron_leviathan_request() -> Value {
    json!({
        "printerModel": "voron2.4",
        "bedSize": 300,
        "controlBoard": "leviathan",
        "probeType": "switch"
    })
}

/// Same as [`voron_leviathan_request`] but for a Trident.
pub fn trident_request() -> Value {
    let mut request = voron_leviathan_request();
    request["printerModel"] = json!("trident");
    request
}

/// Compiles a JSON request with timestamps fixed.
pub fn compile_request(request: &Value) -> ConfigurationDocument {
    let mut document = compile(&registry(), &RawSelection::from_json_value(request));
    document.normalize_for_deterministic();
    document
}

/// Writes a JSON request to a temp file, returning its path and the dir guard.
pub fn write_request_file(request: &Value) -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("request.json");
    std::fs::write(&path, serde_json::to_string_pretty(request).unwrap())
        .expect("Failed to write request file");
    (path, temp_dir)
}

/// Lines of a multi-line option, trimmed.
pub fn option_lines<'a>(
    document: &'a ConfigurationDocument,
    header: &str,
    key: &str,
) -> Vec<&'a str> {
    document
        .block(header)
        .and_then(|b| b.get_lines(key))
        .map(|lines| lines.iter().map(|l| l.trim()).collect())
        .unwrap_or_default()
}
