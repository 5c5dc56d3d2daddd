//! Integration tests for the grnb CLI.
//!
//! Run with: `cargo test --package grn-bool-cli --test cli_integration`

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::json;
use tempfile::TempDir;

/// Helper to run grnb with given arguments and a clean environment.
fn run_grnb(args: &[&str]) -> Output {
    run_grnb_with_env(args, &[])
}

/// Helper to run grnb with extra environment variables.
fn run_grnb_with_env(args: &[&str], vars: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_grnb"));
    command
        .args(args)
        .env_remove("GRNB_CONFIG")
        .env_remove("GRNB_GENE_DELAY")
        .env_remove("GRNB_UNREACHABLE_POLICY")
        .env_remove("RUST_LOG");
    for (key, value) in vars {
        command.env(key, value);
    }
    command.output().expect("Failed to execute grnb command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// signal -> relay -> target <-> partner, signal observed in veg1 at 2..=3.
fn write_relay_model(dir: &Path) -> PathBuf {
    write_relay_model_until(dir, 8)
}

/// The relay model with expression recorded over `0..=until`; regions end at 8.
fn write_relay_model_until(dir: &Path, until: i64) -> PathBuf {
    let expression: Vec<_> = (0..=until)
        .map(|time| {
            let level = if (2..=3).contains(&time) {
                "expressed"
            } else {
                "not_expressed"
            };
            json!({"gene": "signal", "region": "veg1", "time": time, "level": level})
        })
        .collect();

    let model = json!({
        "name": "relay",
        "nodes": [
            {"id": "signal", "name": "signal"},
            {"id": "relay", "name": "relay"},
            {"id": "target", "name": "target"},
            {"id": "partner", "name": "partner"}
        ],
        "links": [
            {"source": "signal", "target": "relay"},
            {"source": "relay", "target": "target"},
            {"source": "target", "target": "partner"},
            {"source": "partner", "target": "target"}
        ],
        "regions": [
            {"name": "embryo", "start": 0, "end": 2, "lineage": ["embryo"]},
            {"name": "veg1", "start": 2, "end": 8, "lineage": ["embryo", "veg1"]},
            {"name": "mes", "start": 2, "end": 8, "lineage": ["embryo", "mes"]}
        ],
        "topology": [
            {"min_time": 2, "max_time": 8, "links": [{"region1": "veg1", "region2": "mes"}]}
        ],
        "expression": expression
    });

    let path = dir.join("relay.json");
    fs::write(&path, serde_json::to_string_pretty(&model).unwrap()).unwrap();
    path
}

// =============================================================================
// Equations Command Tests
// =============================================================================

#[test]
fn test_equations_text() {
    let temp = TempDir::new().unwrap();
    let model = write_relay_model(temp.path());

    let output = run_grnb(&["equations", model.to_str().unwrap()]);

    assert!(output.status.success(), "grnb equations should succeed");
    assert_eq!(
        stdout(&output),
        "partner: AT-1 G:target=1\n\
         relay: AT-1 G:signal=1\n\
         signal: IN D:veg1 AND >2 AND <4\n\
         target: AT-1 G:relay=1 OR AT-1 G:partner=1\n"
    );
}

#[test]
fn test_equations_json() {
    let temp = TempDir::new().unwrap();
    let model = write_relay_model(temp.path());

    let output = run_grnb(&["equations", model.to_str().unwrap(), "--format", "json"]);

    assert!(output.status.success(), "grnb equations --format json should succeed");
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["equations"]["relay"][0], "AT-1 G:signal=1");
    assert_eq!(report["classification"].as_array().unwrap().len(), 4);
    assert!(report["diagnostics"].as_array().unwrap().is_empty());
}

#[test]
fn test_unknown_format_fails() {
    let temp = TempDir::new().unwrap();
    let model = write_relay_model(temp.path());

    let output = run_grnb(&["equations", model.to_str().unwrap(), "--format", "md"]);

    assert!(!output.status.success(), "unknown format should fail");
    assert!(stderr(&output).contains("Unknown format"));
}

// =============================================================================
// Classify Command Tests
// =============================================================================

#[test]
fn test_classify_text() {
    let temp = TempDir::new().unwrap();
    let model = write_relay_model(temp.path());

    let output = run_grnb(&["classify", model.to_str().unwrap()]);

    assert!(output.status.success(), "grnb classify should succeed");
    let stdout = stdout(&output);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "partner -> target\tfeedback",
            "relay -> target\tforward",
            "signal -> relay\tforward",
            "target -> partner\tforward",
        ]
    );
}

#[test]
fn test_classify_json() {
    let temp = TempDir::new().unwrap();
    let model = write_relay_model(temp.path());

    let output = run_grnb(&["classify", model.to_str().unwrap(), "-f", "json"]);

    assert!(output.status.success());
    let edges: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let feedback: Vec<_> = edges
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["class"] == "feedback")
        .collect();
    assert_eq!(feedback.len(), 1);
    assert_eq!(feedback[0]["source"], "partner");
    assert_eq!(feedback[0]["target"], "target");
}

// =============================================================================
// Simulate Command Tests
// =============================================================================

#[test]
fn test_simulate_text() {
    let temp = TempDir::new().unwrap();
    let model = write_relay_model(temp.path());

    let output = run_grnb(&["simulate", model.to_str().unwrap()]);

    assert!(output.status.success(), "grnb simulate should succeed");
    let stdout = stdout(&output);
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("domain\tgene\ttime\tlevel"));
    let rows: Vec<&str> = lines.collect();
    // 4 genes x 2 domains x 9 time steps
    assert_eq!(rows.len(), 4 * 2 * 9);
    assert!(rows.contains(&"veg1\tsignal\t3\texpressed"));
    assert!(rows.contains(&"veg1\trelay\t4\texpressed"));
    assert!(rows.contains(&"mes\trelay\t4\tnot_expressed"));
}

#[test]
fn test_simulate_defaults_to_last_expression_time() {
    let temp = TempDir::new().unwrap();
    let model = write_relay_model_until(temp.path(), 5);

    let output = run_grnb(&["simulate", model.to_str().unwrap(), "-f", "json"]);

    assert!(output.status.success());
    let table: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let relay = table["relay"].as_array().unwrap();
    // 2 domains x timepoints 0..=5, not the region horizon of 8
    assert_eq!(relay.len(), 2 * 6);
    let last = relay.iter().filter_map(|row| row["time"].as_i64()).max();
    assert_eq!(last, Some(5));
}

#[test]
fn test_simulate_max_time_json() {
    let temp = TempDir::new().unwrap();
    let model = write_relay_model(temp.path());

    let output = run_grnb(&[
        "simulate",
        model.to_str().unwrap(),
        "--max-time",
        "3",
        "--format",
        "json",
    ]);

    assert!(output.status.success());
    let table: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let signal = table["signal"].as_array().unwrap();
    assert_eq!(signal.len(), 2 * 4);
    assert!(signal.iter().all(|row| row["time"].as_i64().unwrap() <= 3));
}

#[test]
fn test_simulate_negative_max_time_fails() {
    let temp = TempDir::new().unwrap();
    let model = write_relay_model(temp.path());

    let output = run_grnb(&["simulate", model.to_str().unwrap(), "--max-time=-1"]);

    assert!(!output.status.success());
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_config_file_sets_delay() {
    let temp = TempDir::new().unwrap();
    let model = write_relay_model(temp.path());
    let config = temp.path().join("grnb.json");
    fs::write(&config, r#"{"gene_delay": -2}"#).unwrap();

    let output = run_grnb(&[
        "--config",
        config.to_str().unwrap(),
        "equations",
        model.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("relay: AT-2 G:signal=1"));
}

#[test]
fn test_env_overrides_config_file() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("grnb.json");
    fs::write(&config, r#"{"gene_delay": -2}"#).unwrap();

    let output = run_grnb_with_env(
        &["--config", config.to_str().unwrap(), "config"],
        &[
            ("GRNB_GENE_DELAY", "-3"),
            ("GRNB_UNREACHABLE_POLICY", "break_cycles"),
        ],
    );

    assert!(output.status.success(), "grnb config should succeed");
    let shown: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(shown["synthesis"]["gene_delay"], -3);
    assert_eq!(shown["synthesis"]["unreachable_policy"], "break_cycles");
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_missing_model_fails() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("absent.json");

    let output = run_grnb(&["equations", missing.to_str().unwrap()]);

    assert!(!output.status.success(), "missing model should fail");
    assert!(stderr(&output).contains("Failed to read model"));
}

#[test]
fn test_invalid_model_fails() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.json");
    fs::write(&path, r#"{"nodes": [{"id": 1}]}"#).unwrap();

    let output = run_grnb(&["classify", path.to_str().unwrap()]);

    assert!(!output.status.success(), "invalid model should fail");
    assert!(stderr(&output).contains("Failed to parse model"));
}

#[test]
fn test_help() {
    let output = run_grnb(&["--help"]);

    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.contains("equations"));
    assert!(stdout.contains("classify"));
    assert!(stdout.contains("simulate"));
}
