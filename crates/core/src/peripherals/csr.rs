// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use super::spi::SpiCore;
use crate::{Peripheral, SimResult};
use hachure_diag::regs::csr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

const GPI: u32 = csr::GPI.offset();
const GPO: u32 = csr::GPO.offset();
const GPOE: u32 = csr::GPOE.offset();
const SPI_CONFIG: u32 = csr::SPI_CONFIG.offset();
const SPI_STATUS: u32 = csr::SPI_STATUS.offset();
const XIP_GUARD: u32 = csr::XIP_GUARD.offset();

/// Control/status register block.
///
/// Records every value that became visible on the status pins (`GPO & GPOE`), in
/// order, which is what a bench watching the pins would see.
#[derive(Debug)]
pub struct Csr {
    gpi: u32,
    gpo: u32,
    gpoe: u32,
    trace: Vec<u32>,
    spi: Arc<Mutex<SpiCore>>,
    xip_guard: Arc<AtomicBool>,
}

impl Csr {
    pub fn new(gpi: u32, spi: Arc<Mutex<SpiCore>>, xip_guard: Arc<AtomicBool>) -> Self {
        Self {
            gpi,
            gpo: 0,
            gpoe: 0,
            trace: Vec::new(),
            spi,
            xip_guard,
        }
    }

    pub fn observable(&self) -> u32 {
        self.gpo & self.gpoe
    }

    pub fn trace(&self) -> &[u32] {
        &self.trace
    }

    fn read_reg(&self, offset: u32) -> u32 {
        match offset {
            GPI => self.gpi,
            GPO => self.gpo,
            GPOE => self.gpoe,
            SPI_CONFIG => super::lock(&self.spi).config_bits(),
            SPI_STATUS => super::lock(&self.spi).status().bits(),
            XIP_GUARD => u32::from(self.xip_guard.load(Ordering::SeqCst)),
            _ => 0,
        }
    }

    fn write_reg(&mut self, offset: u32, value: u32) {
        match offset {
            GPO => {
                self.gpo = value;
                self.trace.push(self.observable());
                tracing::debug!("status pins: {:#010b}", self.observable());
            }
            GPOE => self.gpoe = value,
            SPI_CONFIG => super::lock(&self.spi).configure(value),
            XIP_GUARD => {
                let open = value & 1 != 0;
                self.xip_guard.store(open, Ordering::SeqCst);
                tracing::debug!("xip guard {}", if open { "open" } else { "closed" });
            }
            GPI | SPI_STATUS => {
                tracing::warn!("Write of {:#x} to read-only CSR word {} ignored", value, offset);
            }
            _ => {}
        }
    }
}

impl Peripheral for Csr {
    fn read(&mut self, offset: u32) -> SimResult<u32> {
        Ok(self.read_reg(offset))
    }

    fn write(&mut self, offset: u32, value: u32) -> SimResult<()> {
        self.write_reg(offset, value);
        Ok(())
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "gpi": self.gpi,
            "gpo": self.gpo,
            "gpoe": self.gpoe,
            "observable": self.observable(),
            "xip_guard": self.xip_guard.load(Ordering::SeqCst),
        })
    }

    fn as_any(&self) -> Option<&dyn std::any::Any> {
        Some(self)
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn std::any::Any> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hachure_config::SpiWiring;

    fn csr() -> Csr {
        Csr::new(
            0x5A,
            Arc::new(Mutex::new(SpiCore::new(SpiWiring::Loopback))),
            Arc::new(AtomicBool::new(false)),
        )
    }

    #[test]
    fn test_outputs_masked_by_enable() {
        let mut csr = csr();
        csr.write(GPO, 0x3).unwrap();
        csr.write(GPOE, 0xFF).unwrap();
        csr.write(GPO, 0x107).unwrap();
        assert_eq!(csr.trace(), &[0, 0x07]);
        assert_eq!(csr.observable(), 0x07);
    }

    #[test]
    fn test_gpi_is_input_only() {
        let mut csr = csr();
        csr.write(GPI, 0).unwrap();
        assert_eq!(csr.read(GPI).unwrap(), 0x5A);
    }

    #[test]
    fn test_guard_is_shared() {
        let guard = Arc::new(AtomicBool::new(false));
        let mut csr = Csr::new(
            0,
            Arc::new(Mutex::new(SpiCore::new(SpiWiring::Loopback))),
            guard.clone(),
        );
        csr.write(XIP_GUARD, 1).unwrap();
        assert!(guard.load(Ordering::SeqCst));
        assert_eq!(csr.read(XIP_GUARD).unwrap(), 1);
    }
}
