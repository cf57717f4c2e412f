// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use hachure_diag::SelfTest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// How MISO of an SPI core is wired on the bench.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpiWiring {
    /// MISO tied to MOSI.
    #[default]
    Loopback,
    /// MISO floating (pulled high).
    Open,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MemorySizes {
    #[serde(default = "default_rom_size")]
    pub rom: String,
    #[serde(default = "default_ram_size")]
    pub sram: String,
    #[serde(default = "default_ram_size")]
    pub ram: String,
}

fn default_rom_size() -> String {
    "16KiB".to_string()
}

fn default_ram_size() -> String {
    // 2048 words
    "8KiB".to_string()
}

impl Default for MemorySizes {
    fn default() -> Self {
        Self {
            rom: default_rom_size(),
            sram: default_ram_size(),
            ram: default_ram_size(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Wiring {
    #[serde(default)]
    pub spi: SpiWiring,
    #[serde(default)]
    pub efspi: SpiWiring,
    /// Feed UART TX straight back into RX, whatever CTRL says.
    #[serde(default)]
    pub uart_loopback: bool,
}

/// Contents of the flash behind the XIP window.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct XipImage {
    #[serde(default = "default_xip_size")]
    pub size: String,
    /// Word offset -> value. Words not listed keep the boot code: 28 `nop`s, then
    /// `li x1..x31, 0`, then erased flash.
    #[serde(default)]
    pub words: BTreeMap<u32, u32>,
}

fn default_xip_size() -> String {
    "4KiB".to_string()
}

impl Default for XipImage {
    fn default() -> Self {
        Self {
            size: default_xip_size(),
            words: BTreeMap::new(),
        }
    }
}

/// Everything about the simulated SoC that a test bench can vary.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SocDescriptor {
    pub name: String,
    #[serde(default = "default_clock_hz")]
    pub clock_hz: u32,
    #[serde(default)]
    pub memory: MemorySizes,
    #[serde(default)]
    pub wiring: Wiring,
    /// Level applied to the general-purpose inputs.
    #[serde(default)]
    pub gpi: u32,
    #[serde(default)]
    pub xip: XipImage,
}

fn default_clock_hz() -> u32 {
    100_000_000
}

impl Default for SocDescriptor {
    fn default() -> Self {
        Self {
            name: "hachure".to_string(),
            clock_hz: default_clock_hz(),
            memory: MemorySizes::default(),
            wiring: Wiring::default(),
            gpi: 0,
            xip: XipImage::default(),
        }
    }
}

impl SocDescriptor {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open SoC descriptor at {:?}", path.as_ref()))?;
        serde_yaml::from_reader(f).context("Failed to parse SoC descriptor")
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unsupported schema_version '{0}'. Supported versions: '1.0'")]
    UnsupportedSchema(String),
    #[error("Input 'test' cannot be empty")]
    EmptyTest,
    #[error("Unknown self-test '{0}'")]
    UnknownTest(String),
    #[error("Limit 'max_accesses' must be greater than zero")]
    ZeroAccessLimit,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TestInputs {
    /// Self-test program to run, by name (`memory`, `spi`, ...).
    pub test: String,
    /// SoC descriptor, relative to the script.
    #[serde(default)]
    pub system: Option<String>,
    /// Bytes queued on the UART RX pin before the run starts.
    #[serde(default)]
    pub uart_input: Option<String>,
}

impl TestInputs {
    pub fn self_test(&self) -> Option<SelfTest> {
        SelfTest::from_name(self.test.trim())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TestLimits {
    /// Bus accesses before a busy-wait is declared stuck.
    pub max_accesses: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The program latched a verdict and entered its idle loop.
    Halted,
    /// The access budget ran out, normally inside a busy-wait.
    Stalled,
    MemoryViolation,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ExpectedStatusAssertion {
    pub expected_status: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct StatusTraceAssertion {
    pub status_trace: Vec<u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct UartContainsAssertion {
    pub uart_contains: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct StopReasonAssertion {
    pub expected_stop_reason: StopReason,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum TestAssertion {
    ExpectedStatus(ExpectedStatusAssertion),
    StatusTrace(StatusTraceAssertion),
    UartContains(UartContainsAssertion),
    ExpectedStopReason(StopReasonAssertion),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TestScript {
    pub schema_version: String,
    pub inputs: TestInputs,
    pub limits: TestLimits,
    #[serde(default)]
    pub assertions: Vec<TestAssertion>,
}

impl TestScript {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open test script at {:?}", path.as_ref()))?;
        let script: Self =
            serde_yaml::from_reader(f).context("Failed to parse Test Script YAML")?;
        script.validate()?;
        Ok(script)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.schema_version != "1.0" {
            return Err(ConfigError::UnsupportedSchema(self.schema_version.clone()));
        }

        if self.inputs.test.trim().is_empty() {
            return Err(ConfigError::EmptyTest);
        }

        if self.inputs.self_test().is_none() {
            return Err(ConfigError::UnknownTest(self.inputs.test.clone()));
        }

        if self.limits.max_accesses == 0 {
            return Err(ConfigError::ZeroAccessLimit);
        }

        Ok(())
    }
}

pub fn parse_size(size_str: &str) -> Result<u64> {
    use human_size::{Byte, Size, SpecificSize};
    let s: Size = size_str
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid size format: {}", e))?;
    let bytes: SpecificSize<Byte> = s.into();
    Ok(bytes.value() as u64)
}
