// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_hachure"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Hachure SoC bring-up diagnostics"));
}

#[test]
fn test_cli_list_names_every_test() {
    let output = Command::new(env!("CARGO_BIN_EXE_hachure"))
        .arg("list")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    for name in ["memory", "memory_layout", "spi", "efspi", "uart", "xip", "heartbeat"] {
        assert!(stdout.contains(name), "missing {}", name);
    }
}

#[test]
fn test_cli_run_writes_snapshot() {
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let snapshot_path =
        std::env::temp_dir().join(format!("hachure-run-snapshot-{}.json", nonce));
    let _ = std::fs::remove_file(&snapshot_path);

    let output = Command::new(env!("CARGO_BIN_EXE_hachure"))
        .args([
            "run",
            "--test",
            "efspi",
            "--max-accesses",
            "5000",
            "--snapshot",
            snapshot_path.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute hachure");

    assert!(output.status.success());
    assert!(snapshot_path.exists());

    let snapshot_content = std::fs::read_to_string(&snapshot_path).unwrap();
    let snapshot: serde_json::Value = serde_json::from_str(&snapshot_content).unwrap();
    assert_eq!(snapshot["status"], 1);
    assert_eq!(snapshot["status_trace"], serde_json::json!([0, 1]));
    assert_eq!(snapshot["peripherals"]["efspi"]["clocked"], true);

    let _ = std::fs::remove_file(&snapshot_path);
}

#[test]
fn test_cli_run_unknown_test() {
    let output = Command::new(env!("CARGO_BIN_EXE_hachure"))
        .args(["run", "--test", "toggle"])
        .output()
        .expect("Failed to execute hachure");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_cli_run_bad_descriptor() {
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let system_path = std::env::temp_dir().join(format!("hachure-bad-system-{}.yaml", nonce));
    std::fs::write(&system_path, "name: tiny\nmemory:\n  ram: \"6B\"\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_hachure"))
        .args(["run", "--test", "memory", "--system", system_path.to_str().unwrap()])
        .output()
        .expect("Failed to execute hachure");
    assert_eq!(output.status.code(), Some(2));

    let missing = Command::new(env!("CARGO_BIN_EXE_hachure"))
        .args(["run", "--test", "memory", "--system", "/nonexistent/soc.yaml"])
        .output()
        .expect("Failed to execute hachure");
    assert_eq!(missing.status.code(), Some(2));

    let _ = std::fs::remove_file(&system_path);
}
