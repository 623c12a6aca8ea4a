//! End-to-end tests for the `qtally` binary.
//!
//! Each test writes its inputs to a temporary directory and runs the
//! compiled binary on them.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const STUMP: &str = r#"{
    "feature_names": ["pixel_0"],
    "tree": {"nodes": [
        {"kind": "split", "feature": 0, "left": 1, "right": 2},
        {"kind": "leaf", "class_counts": [3.0, 0.0]},
        {"kind": "leaf", "class_counts": [0.0, 2.0]}
    ]}
}"#;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn qtally(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_qtally"))
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ============================================================================
// count
// ============================================================================

#[test]
fn test_count_json_reference_case() {
    let dir = tempfile::tempdir().unwrap();
    let tree = write(dir.path(), "tree.json", STUMP);
    let data = write(dir.path(), "data.json", "[[1.0]]");

    let output = qtally(&[
        "count",
        "--tree",
        tree.to_str().unwrap(),
        "--data",
        data.to_str().unwrap(),
        "--shots",
        "256",
        "--seed",
        "7",
        "--json",
    ]);
    assert!(output.status.success(), "{output:?}");

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["num_terms"], 1);
    assert_eq!(value["estimate"]["outcome"], 4);
    assert_eq!(value["estimate"]["shots"], 256);
    let count = value["estimate"]["estimated_count"].as_f64().unwrap();
    assert!((count - 1.0).abs() < 1e-9);
}

#[test]
fn test_count_table_output() {
    let dir = tempfile::tempdir().unwrap();
    let tree = write(dir.path(), "tree.json", STUMP);
    let data = write(dir.path(), "data.json", "[[1.0]]");

    let output = qtally(&[
        "count",
        "-t",
        tree.to_str().unwrap(),
        "-d",
        data.to_str().unwrap(),
        "--shots",
        "64",
        "--seed",
        "7",
    ]);
    assert!(output.status.success(), "{output:?}");

    // one marked state out of two sits exactly on a register value
    let text = stdout(&output);
    assert!(text.contains("Histogram (64 shots)"));
    assert!(text.contains("Dominant outcome: 4"), "{text}");
    assert!(text.contains("100.0% of shots"), "{text}");
    assert!(text.contains("Estimated count: 1.000 of 2"), "{text}");
}

#[test]
fn test_count_reads_yaml_config() {
    let dir = tempfile::tempdir().unwrap();
    let tree = write(dir.path(), "tree.json", STUMP);
    let data = write(dir.path(), "data.json", "[[1.0]]");
    let config = write(dir.path(), "run.yaml", "precision_width: 4\nshots: 32\nseed: 1\n");

    let output = qtally(&[
        "count",
        "--tree",
        tree.to_str().unwrap(),
        "--data",
        data.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--json",
    ]);
    assert!(output.status.success(), "{output:?}");

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    // four precision bits, all-marked state lands on raw 0
    assert!(value["counts"]["0000"].as_u64().is_some());
    assert_eq!(value["estimate"]["shots"], 32);
    assert_eq!(value["estimate"]["outcome"], 8);
}

#[test]
fn test_count_respects_max_qubits() {
    let dir = tempfile::tempdir().unwrap();
    let tree = write(dir.path(), "tree.json", STUMP);
    let data = write(dir.path(), "data.json", "[[1.0]]");

    let output = qtally(&[
        "count",
        "--tree",
        tree.to_str().unwrap(),
        "--data",
        data.to_str().unwrap(),
        "--max-qubits",
        "4",
    ]);
    assert!(!output.status.success());
    let err = String::from_utf8_lossy(&output.stderr);
    assert!(err.contains("Error:"));
}

#[test]
fn test_count_missing_data_file() {
    let dir = tempfile::tempdir().unwrap();
    let tree = write(dir.path(), "tree.json", STUMP);
    let missing = dir.path().join("missing.json");

    let output = qtally(&[
        "count",
        "--tree",
        tree.to_str().unwrap(),
        "--data",
        missing.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("File not found"));
}

// ============================================================================
// oracle
// ============================================================================

#[test]
fn test_oracle_lists_terms_and_gates() {
    let dir = tempfile::tempdir().unwrap();
    let tree = write(dir.path(), "tree.json", STUMP);

    let output = qtally(&["oracle", "--tree", tree.to_str().unwrap()]);
    assert!(output.status.success(), "{output:?}");

    let text = stdout(&output);
    assert!(text.contains("pixel_0=1"));
    assert!(text.contains("1 emitted"));
    assert!(text.contains("mcx"));
}

#[test]
fn test_oracle_flat_yaml_tree_negative_class() {
    let dir = tempfile::tempdir().unwrap();
    let tree = write(
        dir.path(),
        "tree.yaml",
        "feature_names: [pixel_0, pixel_1]\n\
         tree:\n  \
           feature: [1, -2, -2]\n  \
           children_left: [1, -1, -1]\n  \
           children_right: [2, -1, -1]\n  \
           value: [[1.0, 1.0], [4.0, 0.0], [0.0, 4.0]]\n",
    );

    let output = qtally(&[
        "oracle",
        "--tree",
        tree.to_str().unwrap(),
        "--positive-class",
        "0",
    ]);
    assert!(output.status.success(), "{output:?}");
    assert!(stdout(&output).contains("pixel_1=0"));
}

#[test]
fn test_oracle_feature_filter_skips_term() {
    let dir = tempfile::tempdir().unwrap();
    let tree = write(
        dir.path(),
        "tree.json",
        r#"{
            "feature_names": ["pixel_0", "pixel_1"],
            "tree": {"nodes": [
                {"kind": "split", "feature": 0, "left": 1, "right": 2},
                {"kind": "leaf", "class_counts": [1.0, 0.0]},
                {"kind": "leaf", "class_counts": [0.0, 1.0]}
            ]}
        }"#,
    );

    let output = qtally(&["oracle", "--tree", tree.to_str().unwrap(), "--features", "1"]);
    assert!(output.status.success(), "{output:?}");
    assert!(stdout(&output).contains("0 emitted, 1 outside"));
}

// ============================================================================
// encode
// ============================================================================

#[test]
fn test_encode_prints_support() {
    let dir = tempfile::tempdir().unwrap();
    let data = write(dir.path(), "data.json", "[[1.0, 0.0], [1.0, 0.0], [0.0, 1.0]]");

    let output = qtally(&["encode", "--data", data.to_str().unwrap()]);
    assert!(output.status.success(), "{output:?}");

    let text = stdout(&output);
    assert!(text.contains("2 basis states in support"));
    // index 1 (pixel 0 set) twice, index 2 once
    assert!(text.contains("01"));
    assert!(text.contains("10"));
    assert!(text.contains("0.666667"));
}

#[test]
fn test_encode_rejects_short_rows() {
    let dir = tempfile::tempdir().unwrap();
    let data = write(dir.path(), "data.json", "[[1.0, 0.0], [1.0]]");

    let output = qtally(&["encode", "--data", data.to_str().unwrap()]);
    assert!(!output.status.success());
}

#[test]
fn test_unknown_subcommand() {
    let output = qtally(&["train"]);
    assert!(!output.status.success());
}
