// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod bus;
pub mod memory;
pub mod peripherals;
pub mod runner;
pub mod snapshot;

use hachure_diag::RegisterBus;
use std::any::Any;
use std::sync::{Arc, Mutex};

mod tests;

pub use runner::{run_self_test, RunReport};

/// Bus accesses allowed when nothing else is configured.
pub const DEFAULT_MAX_ACCESSES: u64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimulationError {
    #[error("Memory access violation at {0:#010x}")]
    MemoryViolation(u32),
    #[error("Write to read-only location {0:#010x}")]
    ReadOnly(u32),
    #[error("Access budget exhausted after {0} bus accesses")]
    Stalled(u64),
}

pub type SimResult<T> = Result<T, SimulationError>;

/// Trait representing a memory-mapped peripheral.
///
/// Offsets are word offsets inside the block; the bus has already rejected
/// misaligned addresses. `read` takes `&mut self` because reading a data register
/// pops a FIFO.
pub trait Peripheral: std::fmt::Debug + Send {
    fn read(&mut self, offset: u32) -> SimResult<u32>;
    fn write(&mut self, offset: u32, value: u32) -> SimResult<()>;
    /// Advances internal state by one bus access.
    fn tick(&mut self) {}
    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }
    fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
        None
    }
}

/// The simulated chip as seen by a self-test: the system bus plus an access budget.
///
/// Every access ticks each peripheral once, so an SPI frame or a UART character
/// takes a fixed number of accesses to complete. Once `max_accesses` have been
/// spent the next access fails with [`SimulationError::Stalled`]; that is how a
/// busy-wait that would spin forever on silicon ends in simulation.
pub struct Soc {
    pub name: String,
    pub bus: bus::SystemBus,
    accesses: u64,
    max_accesses: u64,
}

impl Soc {
    pub fn new(bus: bus::SystemBus) -> Self {
        Self::with_budget(bus, DEFAULT_MAX_ACCESSES)
    }

    pub fn with_budget(bus: bus::SystemBus, max_accesses: u64) -> Self {
        Self {
            name: "hachure".to_string(),
            bus,
            accesses: 0,
            max_accesses,
        }
    }

    pub fn from_config(
        soc: &hachure_config::SocDescriptor,
        max_accesses: u64,
    ) -> anyhow::Result<Self> {
        let bus = bus::SystemBus::from_config(soc)?;
        Ok(Self {
            name: soc.name.clone(),
            ..Self::with_budget(bus, max_accesses)
        })
    }

    pub fn accesses(&self) -> u64 {
        self.accesses
    }

    pub fn max_accesses(&self) -> u64 {
        self.max_accesses
    }

    /// Queues bytes on the UART receive line.
    pub fn queue_uart_input(&mut self, bytes: &[u8]) {
        if let Some(uart) = self.bus.find_mut::<peripherals::uart::EfUart>("uart") {
            uart.queue_input(bytes);
        } else {
            tracing::warn!("No UART on this SoC, dropping {} input bytes", bytes.len());
        }
    }

    /// Routes every byte the UART shifts out into `sink`.
    pub fn attach_uart_sink(&mut self, sink: Arc<Mutex<Vec<u8>>>) {
        if let Some(uart) = self.bus.find_mut::<peripherals::uart::EfUart>("uart") {
            uart.set_sink(sink);
        }
    }

    pub fn status_trace(&self) -> Vec<u32> {
        self.bus
            .find::<peripherals::csr::Csr>("csr")
            .map(|csr| csr.trace().to_vec())
            .unwrap_or_default()
    }

    /// The value currently visible on the status pins.
    pub fn status(&self) -> u32 {
        self.bus
            .find::<peripherals::csr::Csr>("csr")
            .map(|csr| csr.observable())
            .unwrap_or(0)
    }

    pub fn snapshot(&self) -> snapshot::SocSnapshot {
        snapshot::SocSnapshot::capture(self)
    }

    fn account(&mut self) -> SimResult<()> {
        if self.accesses >= self.max_accesses {
            return Err(SimulationError::Stalled(self.accesses));
        }
        self.accesses += 1;
        Ok(())
    }
}

impl RegisterBus for Soc {
    type Error = SimulationError;

    fn read_word(&mut self, addr: u32) -> SimResult<u32> {
        self.account()?;
        let value = self.bus.read_u32(addr);
        self.bus.tick_peripherals();
        let value = value?;
        tracing::debug!("R {:#010x} -> {:#010x}", addr, value);
        Ok(value)
    }

    fn write_word(&mut self, addr: u32, value: u32) -> SimResult<()> {
        self.account()?;
        tracing::debug!("W {:#010x} <- {:#010x}", addr, value);
        let res = self.bus.write_u32(addr, value);
        self.bus.tick_peripherals();
        res
    }
}
