//! Integration tests for graphstat
//!
//! These drive the built binary end to end against graph documents on disk.

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const SAMPLE: &str = r#"{
  "nodes": [
    {"id": "A", "group": 1},
    {"id": "B", "group": 1},
    {"id": "C", "group": 2},
    {"id": "D", "group": 3}
  ],
  "links": [
    {"source": "A", "target": "B"},
    {"source": "B", "target": "C"}
  ]
}"#;

/// Temp working directory holding `graph.json`, so no stray `.env` or
/// `graphstat.toml` is picked up.
fn workspace(json: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.json");
    std::fs::write(&path, json).unwrap();
    (dir, path)
}

fn graphstat(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_graphstat"))
        .args(args)
        .current_dir(dir)
        .env_remove("GRAPHSTAT_MAX_APSP_NODES")
        .env_remove("GRAPHSTAT_PATH_STRATEGY")
        .env_remove("GRAPHSTAT_WATCH_DEBOUNCE_MS")
        .output()
        .expect("Failed to execute graphstat")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "graphstat failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    let output = graphstat(dir.path(), &["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("graphstat"));
    assert!(stdout.contains("stats"));
    assert!(stdout.contains("largest"));
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    let output = graphstat(dir.path(), &["version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("graphstat v"));
}

#[test]
fn test_stats_of_sample() {
    let (dir, _) = workspace(SAMPLE);
    let stats = stdout_json(&graphstat(dir.path(), &["stats", "graph.json"]));

    assert_eq!(stats["node_count"], 4);
    assert_eq!(stats["edge_count"], 2);
    assert_eq!(stats["average_degree"], 1.0);
    assert_eq!(stats["component_count"], 2);
    assert_eq!(stats["largest_component_size"], 3);
    assert_eq!(stats["diameter"], 2);
    let apl = stats["average_path_length"].as_f64().unwrap();
    assert!((apl - 4.0 / 3.0).abs() < 1e-9);
    assert_eq!(stats["content_hash"].as_str().unwrap().len(), 16);
}

#[test]
fn test_stats_pretty_is_multiline() {
    let (dir, _) = workspace(SAMPLE);
    let output = graphstat(dir.path(), &["stats", "graph.json", "--pretty"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().count() > 5);
    assert_eq!(stdout_json(&output)["node_count"], 4);
}

#[test]
fn test_stats_of_single_node_has_nulls() {
    let (dir, _) = workspace(r#"{"nodes": [{"id": 1}], "edges": []}"#);
    let stats = stdout_json(&graphstat(dir.path(), &["stats", "graph.json"]));
    assert_eq!(stats["density"], Value::Null);
    assert_eq!(stats["diameter"], Value::Null);
    assert_eq!(stats["average_path_length"], Value::Null);
}

#[test]
fn test_components() {
    let (dir, _) = workspace(SAMPLE);
    let report = stdout_json(&graphstat(dir.path(), &["components", "graph.json"]));
    assert_eq!(report["count"], 2);
    assert_eq!(
        report["components"],
        serde_json::json!([["A", "B", "C"], ["D"]])
    );
}

#[test]
fn test_paths_from_source() {
    let (dir, _) = workspace(SAMPLE);
    let paths = stdout_json(&graphstat(
        dir.path(),
        &["paths", "graph.json", "--source", "A"],
    ));
    assert_eq!(
        paths,
        serde_json::json!([
            {"id": "A", "distance": 0},
            {"id": "B", "distance": 1},
            {"id": "C", "distance": 2},
            {"id": "D", "distance": null}
        ])
    );
}

#[test]
fn test_paths_unknown_source_fails() {
    let (dir, _) = workspace(SAMPLE);
    let output = graphstat(dir.path(), &["paths", "graph.json", "--source", "Z"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("node not found: Z"));
}

#[test]
fn test_largest_to_file() {
    let (dir, _) = workspace(SAMPLE);
    let output = graphstat(
        dir.path(),
        &["largest", "graph.json", "--output", "largest.json"],
    );
    assert!(output.status.success());

    let text = std::fs::read_to_string(dir.path().join("largest.json")).unwrap();
    let sub: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(sub["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(sub["edges"].as_array().unwrap().len(), 2);
    assert_eq!(sub["nodes"][2], serde_json::json!({"id": "C", "group": 2}));

    // The extracted document is itself a valid input.
    let stats = stdout_json(&graphstat(dir.path(), &["stats", "largest.json"]));
    assert_eq!(stats["component_count"], 1);
    assert_eq!(stats["density"], 2.0 / 3.0);
}

#[test]
fn test_missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let output = graphstat(dir.path(), &["stats", "nope.json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("nope.json"));
}

#[test]
fn test_dangling_edge_is_an_error() {
    let (dir, _) = workspace(
        r#"{"nodes": [{"id": "A"}], "links": [{"source": "A", "target": "ghost"}]}"#,
    );
    let output = graphstat(dir.path(), &["stats", "graph.json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing node ghost"));
}

#[test]
fn test_config_size_guard() {
    let (dir, _) = workspace(SAMPLE);
    std::fs::write(
        dir.path().join("graphstat.toml"),
        "[engine]\nmax_apsp_nodes = 3\n",
    )
    .unwrap();

    let output = graphstat(dir.path(), &["stats", "graph.json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("all-pairs limit is 3"));

    // Components need no all-pairs pass.
    let report = stdout_json(&graphstat(dir.path(), &["components", "graph.json"]));
    assert_eq!(report["count"], 2);
}

#[test]
fn test_env_size_guard() {
    let (dir, _) = workspace(SAMPLE);
    let output = Command::new(env!("CARGO_BIN_EXE_graphstat"))
        .args(["stats", "graph.json"])
        .current_dir(dir.path())
        .env("GRAPHSTAT_MAX_APSP_NODES", "2")
        .output()
        .expect("Failed to execute graphstat");
    assert!(!output.status.success());
}

#[test]
fn test_floyd_warshall_strategy_agrees() {
    let (dir, _) = workspace(SAMPLE);
    std::fs::write(
        dir.path().join("fw.toml"),
        "[engine]\npath_strategy = \"floyd-warshall\"\n",
    )
    .unwrap();
    let bfs = stdout_json(&graphstat(dir.path(), &["stats", "graph.json"]));
    let fw = stdout_json(&graphstat(
        dir.path(),
        &["--config", "fw.toml", "stats", "graph.json"],
    ));
    assert_eq!(bfs["average_path_length"], fw["average_path_length"]);
}
