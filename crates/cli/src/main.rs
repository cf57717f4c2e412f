// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use hachure_config::{SocDescriptor, StopReason, TestAssertion, TestScript};
use hachure_core::{run_self_test, RunReport, Soc};
use hachure_diag::SelfTest;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

const EXIT_PASS: u8 = 0;
const EXIT_ASSERT_FAIL: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_RUNTIME_ERROR: u8 = 3;

/// Scripts asking for more than this are rejected as misconfigured.
const MAX_ALLOWED_ACCESSES: u64 = 50_000_000;

#[derive(Parser, Debug)]
#[command(author, version, about = "Hachure SoC bring-up diagnostics", long_about = None)]
struct Cli {
    /// Log every register access and status change
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one self-test on the simulated SoC and print what it reported
    Run(RunArgs),
    /// Run a test script and check its assertions
    Test(TestArgs),
    /// List the self-tests
    List,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Self-test to run (see `hachure list`)
    #[arg(long)]
    test: String,

    /// SoC descriptor (YAML)
    #[arg(short, long)]
    system: Option<PathBuf>,

    /// Text queued on the UART receive line before the run
    #[arg(long)]
    uart_input: Option<String>,

    /// Bus accesses before a busy-wait counts as stuck
    #[arg(long, default_value_t = hachure_core::DEFAULT_MAX_ACCESSES)]
    max_accesses: u64,

    /// Write a JSON snapshot of the SoC here when the run stops
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TestArgs {
    /// Test script (YAML)
    #[arg(long)]
    script: PathBuf,

    /// Directory for result.json and junit.xml
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Write a JUnit report to this path as well
    #[arg(long)]
    junit: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    let result = match cli.command {
        Command::Run(args) => run(args),
        Command::Test(args) => test(args),
        Command::List => {
            for t in SelfTest::ALL {
                let kind = if t.terminates() { "latches a verdict" } else { "runs forever" };
                println!("{:<14} {}", t.name(), kind);
            }
            Ok(EXIT_PASS)
        }
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_RUNTIME_ERROR)
        }
    }
}

fn load_descriptor(path: Option<&Path>) -> anyhow::Result<SocDescriptor> {
    match path {
        Some(path) => {
            info!("Loading SoC descriptor: {:?}", path);
            SocDescriptor::from_file(path)
        }
        None => {
            info!("Using default SoC configuration");
            Ok(SocDescriptor::default())
        }
    }
}

fn run(args: RunArgs) -> anyhow::Result<u8> {
    let Some(test) = SelfTest::from_name(&args.test) else {
        error!("Unknown self-test '{}'", args.test);
        return Ok(EXIT_CONFIG_ERROR);
    };
    if args.max_accesses == 0 {
        error!("--max-accesses must be greater than zero");
        return Ok(EXIT_CONFIG_ERROR);
    }

    let soc = load_descriptor(args.system.as_deref())
        .and_then(|descriptor| Soc::from_config(&descriptor, args.max_accesses));
    let mut soc = match soc {
        Ok(soc) => soc,
        Err(e) => {
            error!("{:#}", e);
            return Ok(EXIT_CONFIG_ERROR);
        }
    };
    if let Some(input) = &args.uart_input {
        soc.queue_uart_input(input.as_bytes());
    }

    let report = run_self_test(&mut soc, test);
    log_report(&report);

    if let Some(path) = &args.snapshot {
        let json = serde_json::to_string_pretty(&soc.snapshot())?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write snapshot to {:?}", path))?;
        info!("Snapshot written to {:?}", path);
    }

    Ok(EXIT_PASS)
}

fn log_report(report: &RunReport) {
    info!(
        "Stopped: {:?} after {} accesses",
        report.stop_reason, report.accesses
    );
    match report.verdict {
        Some(v) => info!("Verdict: {} ({:#06b})", v, v),
        None => info!("No verdict latched"),
    }
    info!("Status trace: {:?}", report.status_trace);
    if !report.uart_tx.is_empty() {
        info!("UART TX: {:?}", report.uart_text());
    }
    if let Some(e) = &report.error {
        info!("Stopped by: {}", e);
    }
}

#[derive(Debug, Serialize)]
struct AssertionResult {
    assertion: String,
    passed: bool,
    detail: String,
}

#[derive(Debug, Serialize)]
struct ConfigRecord {
    script: String,
    system: Option<String>,
    max_accesses: u64,
}

#[derive(Debug, Serialize)]
struct TestResult {
    status: &'static str,
    test: String,
    stop_reason: StopReason,
    verdict: Option<u32>,
    final_status: u32,
    status_trace: Vec<u32>,
    uart_tx: String,
    accesses: u64,
    assertions: Vec<AssertionResult>,
    config: ConfigRecord,
}

fn check(assertion: &TestAssertion, report: &RunReport) -> AssertionResult {
    match assertion {
        TestAssertion::ExpectedStatus(a) => AssertionResult {
            assertion: format!("expected_status: {}", a.expected_status),
            passed: report.status == a.expected_status,
            detail: format!("status pins read {}", report.status),
        },
        TestAssertion::StatusTrace(a) => AssertionResult {
            assertion: format!("status_trace: {:?}", a.status_trace),
            passed: report.status_trace == a.status_trace,
            detail: format!("observed {:?}", report.status_trace),
        },
        TestAssertion::UartContains(a) => AssertionResult {
            assertion: format!("uart_contains: {:?}", a.uart_contains),
            passed: report.uart_text().contains(&a.uart_contains),
            detail: format!("{} bytes transmitted", report.uart_tx.len()),
        },
        TestAssertion::ExpectedStopReason(a) => AssertionResult {
            assertion: format!("expected_stop_reason: {:?}", a.expected_stop_reason),
            passed: report.stop_reason == a.expected_stop_reason,
            detail: format!("stopped with {:?}", report.stop_reason),
        },
    }
}

fn test(args: TestArgs) -> anyhow::Result<u8> {
    let script = match TestScript::from_file(&args.script) {
        Ok(script) => script,
        Err(e) => {
            error!("{:#}", e);
            return Ok(EXIT_CONFIG_ERROR);
        }
    };
    if script.limits.max_accesses > MAX_ALLOWED_ACCESSES {
        error!(
            "max_accesses {} exceeds the allowed maximum of {}",
            script.limits.max_accesses, MAX_ALLOWED_ACCESSES
        );
        return Ok(EXIT_CONFIG_ERROR);
    }
    let Some(test) = script.inputs.self_test() else {
        error!("Unknown self-test '{}'", script.inputs.test);
        return Ok(EXIT_CONFIG_ERROR);
    };

    // Relative paths in the script are relative to the script itself.
    let base = args
        .script
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    let system = script.inputs.system.as_ref().map(|s| base.join(s));
    let descriptor = match load_descriptor(system.as_deref()) {
        Ok(d) => d,
        Err(e) => {
            error!("{:#}", e);
            return Ok(EXIT_CONFIG_ERROR);
        }
    };
    let mut soc = match Soc::from_config(&descriptor, script.limits.max_accesses) {
        Ok(soc) => soc,
        Err(e) => {
            error!("{:#}", e);
            return Ok(EXIT_CONFIG_ERROR);
        }
    };
    if let Some(input) = &script.inputs.uart_input {
        soc.queue_uart_input(input.as_bytes());
    }

    let report = run_self_test(&mut soc, test);
    log_report(&report);

    let assertions: Vec<AssertionResult> = script
        .assertions
        .iter()
        .map(|a| check(a, &report))
        .collect();
    for a in assertions.iter().filter(|a| !a.passed) {
        error!("Assertion failed: {} ({})", a.assertion, a.detail);
    }
    let passed = assertions.iter().all(|a| a.passed);

    let result = TestResult {
        status: if passed { "pass" } else { "fail" },
        test: report.test.clone(),
        stop_reason: report.stop_reason,
        verdict: report.verdict,
        final_status: report.status,
        status_trace: report.status_trace.clone(),
        uart_tx: report.uart_text(),
        accesses: report.accesses,
        assertions,
        config: ConfigRecord {
            script: args.script.display().to_string(),
            system: system.map(|p| p.display().to_string()),
            max_accesses: script.limits.max_accesses,
        },
    };

    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {:?}", dir))?;
        std::fs::write(dir.join("result.json"), serde_json::to_string_pretty(&result)?)
            .context("Failed to write result.json")?;
        std::fs::write(dir.join("junit.xml"), junit(&result))
            .context("Failed to write junit.xml")?;
        info!("Results written to {:?}", dir);
    }
    if let Some(path) = &args.junit {
        std::fs::write(path, junit(&result))
            .with_context(|| format!("Failed to write JUnit report to {:?}", path))?;
    }

    info!("Test {}", result.status);
    Ok(if passed { EXIT_PASS } else { EXIT_ASSERT_FAIL })
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn junit(result: &TestResult) -> String {
    let failures = result.assertions.iter().filter(|a| !a.passed).count();
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<testsuite name=\"hachure test\" tests=\"{}\" failures=\"{}\">\n",
        result.assertions.len(),
        failures
    ));
    for a in &result.assertions {
        xml.push_str(&format!(
            "  <testcase classname=\"{}\" name=\"{}\">",
            xml_escape(&result.test),
            xml_escape(&a.assertion)
        ));
        if !a.passed {
            xml.push_str(&format!(
                "<failure message=\"{}\"/>",
                xml_escape(&a.detail)
            ));
        }
        xml.push_str("</testcase>\n");
    }
    xml.push_str("</testsuite>\n");
    xml
}
