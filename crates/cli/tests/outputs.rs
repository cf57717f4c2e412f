// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn scratch_dir(prefix: &str) -> PathBuf {
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir()
        .join("hachure-tests")
        .join(format!("{}-{}", prefix, nonce));
    std::fs::create_dir_all(&dir).expect("Failed to create scratch dir");
    dir
}

fn run_script(dir: &Path, script: &str, extra: &[&str]) -> Output {
    let script_path = dir.join("script.yaml");
    std::fs::write(&script_path, script).expect("Failed to write script");

    let mut args = vec!["test", "--script", script_path.to_str().unwrap()];
    args.extend_from_slice(extra);
    Command::new(env!("CARGO_BIN_EXE_hachure"))
        .args(&args)
        .output()
        .expect("Failed to execute command")
}

#[test]
fn test_cli_test_mode_outputs() {
    let dir = scratch_dir("outputs");
    let output_dir = dir.join("artifacts");

    let output = run_script(
        &dir,
        r#"
schema_version: "1.0"
inputs:
  test: "memory"
limits:
  max_accesses: 10000
assertions:
  - expected_status: 7
  - status_trace: [1, 2, 3, 7, 15, 7]
  - expected_stop_reason: halted
"#,
        &["--output-dir", output_dir.to_str().unwrap()],
    );
    assert!(output.status.success());

    let result_content = std::fs::read_to_string(output_dir.join("result.json")).unwrap();
    let result: serde_json::Value = serde_json::from_str(&result_content).unwrap();
    assert_eq!(result["status"], "pass");
    assert_eq!(result["test"], "memory");
    assert_eq!(result["stop_reason"], "halted");
    assert_eq!(result["verdict"], 7);
    assert_eq!(result["assertions"].as_array().unwrap().len(), 3);
    assert_eq!(result["config"]["max_accesses"], 10000);

    let junit = std::fs::read_to_string(output_dir.join("junit.xml")).unwrap();
    assert!(junit.contains("<testsuite"));
    assert!(junit.contains("failures=\"0\""));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_system_path_is_relative_to_script() {
    let dir = scratch_dir("open-spi");
    std::fs::write(
        dir.join("open.yaml"),
        "name: open-bench\nwiring:\n  spi: open\n",
    )
    .unwrap();

    let output = run_script(
        &dir,
        r#"
schema_version: "1.0"
inputs:
  test: "spi"
  system: "open.yaml"
limits:
  max_accesses: 10000
assertions:
  - expected_status: 2
  - status_trace: [0, 2]
"#,
        &[],
    );
    assert!(output.status.success());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_test_mode_memory_violation() {
    let dir = scratch_dir("memviol");
    std::fs::write(dir.join("small.yaml"), "name: small\nmemory:\n  sram: \"2KiB\"\n").unwrap();

    let output = run_script(
        &dir,
        r#"
schema_version: "1.0"
inputs:
  test: "memory"
  system: "small.yaml"
limits:
  max_accesses: 10000
assertions:
  - expected_stop_reason: memory_violation
"#,
        &[],
    );
    assert!(output.status.success());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_uart_echo() {
    let dir = scratch_dir("uart");
    let output_dir = dir.join("out");

    let output = run_script(
        &dir,
        r#"
schema_version: "1.0"
inputs:
  test: "uart"
  uart_input: "ping"
limits:
  max_accesses: 100000
assertions:
  - uart_contains: "ping"
  - expected_stop_reason: stalled
"#,
        &["--output-dir", output_dir.to_str().unwrap()],
    );
    assert!(output.status.success());

    let result: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output_dir.join("result.json")).unwrap())
            .unwrap();
    assert_eq!(result["uart_tx"], "ping");
    assert!(result["verdict"].is_null());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_test_mode_assertion_fail() {
    let dir = scratch_dir("assert-fail");
    let output_dir = dir.join("out");

    let output = run_script(
        &dir,
        r#"
schema_version: "1.0"
inputs:
  test: "xip"
limits:
  max_accesses: 10000
assertions:
  - expected_status: 4
"#,
        &["--output-dir", output_dir.to_str().unwrap()],
    );
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1)); // EXIT_ASSERT_FAIL

    let result: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output_dir.join("result.json")).unwrap())
            .unwrap();
    assert_eq!(result["status"], "fail");
    assert_eq!(result["final_status"], 5);
    assert_eq!(result["assertions"][0]["passed"], false);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_test_mode_max_accesses_guard() {
    let dir = scratch_dir("huge");
    let output = run_script(
        &dir,
        r#"
schema_version: "1.0"
inputs:
  test: "heartbeat"
limits:
  max_accesses: 60000000
"#,
        &[],
    );
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2)); // EXIT_CONFIG_ERROR

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_test_mode_unknown_test() {
    let dir = scratch_dir("unknown");
    let output = run_script(
        &dir,
        r#"
schema_version: "1.0"
inputs:
  test: "dma"
limits:
  max_accesses: 100
"#,
        &[],
    );
    assert_eq!(output.status.code(), Some(2));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_test_mode_junit_flag_writes_file() {
    let dir = scratch_dir("junit");
    let junit_path = dir.join("report.xml");

    let output = run_script(
        &dir,
        r#"
schema_version: "1.0"
inputs:
  test: "heartbeat"
limits:
  max_accesses: 500
assertions:
  - expected_stop_reason: stalled
"#,
        &["--junit", junit_path.to_str().unwrap()],
    );
    assert!(output.status.success());

    let junit = std::fs::read_to_string(&junit_path).unwrap();
    assert!(junit.contains("hachure test"));
    assert!(junit.contains("<testcase"));

    let _ = std::fs::remove_dir_all(&dir);
}
