// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Loopback through the basic SPI core.
//!
//! The core has a single data register: a write starts a frame and asserts
//! chip-select on its own (auto-CS), a read returns what came in on MISO. Its
//! configuration and status registers live in the CSR block. The bench wires MISO
//! back to MOSI, so the probe byte must come back unchanged.

use crate::fault::{self, Fault};
use crate::mmio::RegisterBus;
use crate::regs::csr;
use crate::regs::spi::{self, FrameSize, SpiConfig, SpiStatus};
use crate::selftest::conclude;
use crate::status::{StatusPort, StatusWord};
use crate::wait;

/// Byte sent and expected back.
pub const PROBE: u8 = 0x1D;

pub const CONFIG: SpiConfig = SpiConfig {
    prescaler: 1,
    clock_inverted: false,
    auto_cs: true,
    frame: FrameSize::Bits8,
};

pub fn configure<B: RegisterBus + ?Sized>(bus: &mut B, config: SpiConfig) -> Result<(), B::Error> {
    csr::SPI_CONFIG.write(bus, config.bits())
}

/// Shifts one byte out and returns the byte that came back.
///
/// The frame is shifted MSB first out of the top of the data word.
pub fn transfer<B: RegisterBus + ?Sized>(bus: &mut B, byte: u8) -> Result<u8, B::Error> {
    spi::DATA.write(bus, u32::from(byte) << 24)?;
    wait::until(bus, csr::SPI_STATUS, |s| {
        SpiStatus::from_bits_truncate(s).contains(SpiStatus::DONE)
    })?;
    let rx = spi::DATA.read(bus)? & 0xFF;
    debug!("spi: sent {:#04x}, received {:#04x}", byte, rx);
    Ok(rx as u8)
}

fn body<B: RegisterBus + ?Sized>(bus: &mut B) -> Result<(), Fault<B::Error>> {
    configure(bus, CONFIG)?;
    let rx = transfer(bus, PROBE)?;
    fault::compare(spi::DATA.addr(), u32::from(PROBE), u32::from(rx))
}

/// Reports [`StatusWord::PASS`] when the probe comes back, [`StatusWord::FAIL`]
/// otherwise.
pub fn run<B: RegisterBus + ?Sized>(bus: &mut B) -> Result<StatusWord, B::Error> {
    StatusPort::enable(bus)?;
    StatusPort::report(bus, StatusWord::IDLE)?;
    let outcome = body(bus);
    conclude(bus, outcome, StatusWord::PASS, StatusWord::FAIL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Access, RecordingBus};

    /// Completes every frame at once; `echo` decides what MISO carried.
    fn wired(echo: fn(u32) -> u32) -> RecordingBus {
        RecordingBus::new().on_write(move |addr, words| {
            if addr == spi::DATA.addr() {
                let sent = words[&addr];
                words.insert(addr, echo(sent >> 24));
                words.insert(csr::SPI_STATUS.addr(), SpiStatus::DONE.bits());
            }
        })
    }

    #[test]
    fn test_loopback_passes() {
        let mut bus = wired(|b| b);
        assert_eq!(run(&mut bus).unwrap(), StatusWord::PASS);
        assert_eq!(bus.peek(csr::SPI_CONFIG.addr()), 0x21);
        assert_eq!(bus.writes_to(spi::DATA.addr()), vec![0x1D00_0000]);
        assert_eq!(bus.writes_to(csr::GPO.addr()), vec![0, 1]);
    }

    #[test]
    fn test_open_miso_fails() {
        let mut bus = wired(|_| 0xFF);
        assert_eq!(run(&mut bus).unwrap(), StatusWord::FAIL);
        assert_eq!(bus.writes_to(csr::GPO.addr()), vec![0, 2]);
    }

    #[test]
    fn test_configured_before_first_transfer() {
        let mut bus = wired(|b| b);
        run(&mut bus).unwrap();
        let first_data = bus
            .log()
            .iter()
            .position(|a| *a == Access::Write(spi::DATA.addr(), 0x1D00_0000))
            .unwrap();
        let config = bus
            .log()
            .iter()
            .position(|a| *a == Access::Write(csr::SPI_CONFIG.addr(), 0x21))
            .unwrap();
        assert!(config < first_data);
    }

    #[test]
    fn test_hangs_without_completion() {
        let mut bus = RecordingBus::with_budget(1_000);
        assert!(run(&mut bus).is_err());
        assert_eq!(bus.writes_to(csr::GPO.addr()), vec![0]);
    }
}
