//! Integration tests for the NFTNET CLI
//!
//! Runs the `nftnet` binary inside temporary directories. Nothing here talks
//! to a real API: network-facing commands are pointed at a closed local port.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

use nftnet_core::{build_graph, CollectionDescriptor, CollectionHolders, HolderSet, NetworkDocument};

// ============================================================================
// Test Utilities
// ============================================================================

/// Unroutable source so any network call fails fast.
const CLOSED_PORT_URL: &str = "http://127.0.0.1:9";

fn nftnet_binary() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_nftnet"));
    cmd.env_remove("RUST_LOG")
        .env("NFTNET_CATALOG_URL", CLOSED_PORT_URL)
        .env("NFTNET_HOLDERS_URL", CLOSED_PORT_URL);
    cmd
}

fn run_nftnet(dir: &Path, args: &[&str]) -> Output {
    nftnet_binary()
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to execute nftnet command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn holders(addrs: &[&str]) -> HolderSet {
    addrs.iter().map(|s| s.to_string()).collect()
}

/// Write a three-collection network (A-B linked, C isolated) into `dir`.
fn write_sample_network(dir: &Path) -> PathBuf {
    let a = CollectionDescriptor::new("0xa", "Alpha").with_volume_30d(300.0);
    let b = CollectionDescriptor::new("0xb", "Beta").with_volume_30d(200.0);
    let c = CollectionDescriptor::new("0xc", "Gamma").with_volume_30d(100.0);
    let (ha, hb, hc) = (
        holders(&["0x1", "0x2", "0x3"]),
        holders(&["0x2", "0x3", "0x4"]),
        holders(&["0x9"]),
    );

    let graph = build_graph(
        &[
            CollectionHolders::new(&a, &ha),
            CollectionHolders::new(&b, &hb),
            CollectionHolders::new(&c, &hc),
        ],
        2,
    );
    let doc = NetworkDocument::new(graph, 3, 10);

    let path = dir.join("network.json");
    doc.save(&path).expect("Failed to write sample network");
    path
}

// ============================================================================
// Help
// ============================================================================

#[test]
fn test_help_lists_commands() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run_nftnet(temp_dir.path(), &["--help"]);

    assert!(output.status.success());
    let out = stdout(&output);
    for command in ["generate", "summary", "details", "completions"] {
        assert!(out.contains(command), "help should list {}", command);
    }
}

#[test]
fn test_no_command_prints_help() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run_nftnet(temp_dir.path(), &[]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("Usage"));
}

// ============================================================================
// Summary Command Tests
// ============================================================================

#[test]
fn test_summary_table() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_sample_network(temp_dir.path());

    let output = run_nftnet(temp_dir.path(), &["summary", "network.json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("Network Overview"));
    assert!(out.contains("Alpha"));
    assert!(out.contains("Gamma"));
    assert!(out.contains("Strongest Connections"));
}

#[test]
fn test_summary_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_sample_network(temp_dir.path());

    let output = run_nftnet(
        temp_dir.path(),
        &["summary", "network.json", "--format", "json", "--top", "1"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let json: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("summary should be valid JSON");
    assert_eq!(json["collections_analyzed"], 3);
    assert_eq!(json["total_nodes"], 3);
    assert_eq!(json["total_edges"], 1);
    assert_eq!(json["top_by_influence"].as_array().unwrap().len(), 1);
    assert_eq!(json["strongest_connections"][0]["shared_holders"], 2);
}

#[test]
fn test_summary_format_from_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_sample_network(temp_dir.path());
    fs::write(
        temp_dir.path().join(".nftnetrc.toml"),
        "[output]\nformat = \"json\"\n",
    )
    .unwrap();

    let output = run_nftnet(temp_dir.path(), &["summary", "network.json"]);
    assert!(output.status.success());
    assert!(serde_json::from_str::<serde_json::Value>(&stdout(&output)).is_ok());
}

#[test]
fn test_summary_missing_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run_nftnet(temp_dir.path(), &["summary", "absent.json"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to load network document"));
}

#[test]
fn test_summary_rejects_invalid_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(temp_dir.path().join("broken.json"), "{ not json").unwrap();

    let output = run_nftnet(temp_dir.path(), &["summary", "broken.json"]);
    assert!(!output.status.success());
}

#[test]
fn test_summary_rejects_dangling_edge() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_sample_network(temp_dir.path());

    let mut json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    json["graph"]["edges"][0]["target"] = serde_json::json!("0xmissing");
    fs::write(&path, json.to_string()).unwrap();

    let output = run_nftnet(temp_dir.path(), &["summary", "network.json"]);
    assert!(!output.status.success());
}

// ============================================================================
// Generate Command Tests
// ============================================================================

#[test]
fn test_generate_rejects_zero_limit() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run_nftnet(temp_dir.path(), &["generate", "--limit", "0"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("--limit"));
}

#[test]
fn test_generate_rejects_missing_output_dir() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run_nftnet(
        temp_dir.path(),
        &["generate", "--output", "missing/network.json"],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Output directory does not exist"));
}

#[test]
fn test_generate_unreachable_catalog_reports_error_document() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run_nftnet(
        temp_dir.path(),
        &[
            "generate",
            "--limit",
            "5",
            "--output",
            "network.json",
            "--format",
            "json",
            "--quiet",
        ],
    );

    assert!(!output.status.success());
    let json: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("error document should be JSON");
    assert_eq!(json["error"], "Failed to fetch collections");
    assert_eq!(json["phase"], "catalog");
    assert!(!temp_dir.path().join("network.json").exists());
}

#[test]
fn test_generate_strict_rejects_bad_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(temp_dir.path().join(".nftnetrc.toml"), "[catalog\n").unwrap();

    let output = run_nftnet(temp_dir.path(), &["generate", "--strict"]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains(".nftnetrc.toml"));
    assert!(!err.contains("using defaults"), "stderr: {}", err);
}

#[test]
fn test_lenient_config_falls_back_to_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_sample_network(temp_dir.path());
    fs::write(temp_dir.path().join(".nftnetrc.toml"), "[output\n").unwrap();

    let output = run_nftnet(temp_dir.path(), &["summary", "network.json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("using defaults"));
    assert!(stdout(&output).contains("Network Overview"));
}

// ============================================================================
// Completions
// ============================================================================

#[test]
fn test_bash_completions() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run_nftnet(temp_dir.path(), &["completions", "bash"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("nftnet"));
}
