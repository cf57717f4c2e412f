// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Loopback through the extended SPI core.
//!
//! Same protocol as [`super::spi`] against a different block: the clock gate must
//! be opened before anything else in the block reacts, RX and TX have their own
//! registers, chip-select is driven through CTRL rather than automatically, and
//! completion is signalled by a status bit going *low*.
//!
//! The register sequence below is the one the bench was validated with and is kept
//! exactly: a probe frame goes out with the peripheral selected, CTRL is then
//! cleared (chip-select high), and the measured frame follows.

use crate::fault::{self, Fault};
use crate::mmio::RegisterBus;
use crate::regs::efspi::{self, EfSpiCfg, EfSpiCtrl, EfSpiStatus};
use crate::selftest::conclude;
use crate::status::{StatusPort, StatusWord};
use crate::wait;

pub const PROBE: u8 = 0x1D;
pub const PRESCALER: u32 = 10;

/// Mode 0: clock idles low, data sampled on the rising edge.
pub const MODE: EfSpiCfg = EfSpiCfg::empty();

pub fn configure<B: RegisterBus + ?Sized>(bus: &mut B) -> Result<(), B::Error> {
    efspi::GCLK.write(bus, 1)?;
    efspi::CFG.write(bus, MODE.bits())?;
    efspi::CTRL.write(bus, EfSpiCtrl::all().bits())?;
    efspi::PR.write(bus, PRESCALER)
}

/// Sends the probe frame and then raises chip-select.
pub fn probe<B: RegisterBus + ?Sized>(bus: &mut B) -> Result<(), B::Error> {
    efspi::TXDATA.write(bus, u32::from(PROBE))?;
    efspi::CTRL.write(bus, EfSpiCtrl::empty().bits())
}

/// Shifts one byte out (chip-select drops again with the write) and returns the
/// oldest byte in the RX FIFO.
pub fn transfer<B: RegisterBus + ?Sized>(bus: &mut B, byte: u8) -> Result<u8, B::Error> {
    efspi::TXDATA.write(bus, u32::from(byte))?;
    wait::until(bus, efspi::STATUS, |s| {
        !EfSpiStatus::from_bits_truncate(s).contains(EfSpiStatus::RX_EMPTY)
    })?;
    let rx = efspi::RXDATA.read(bus)? & 0xFF;
    debug!("efspi: sent {:#04x}, received {:#04x}", byte, rx);
    Ok(rx as u8)
}

fn body<B: RegisterBus + ?Sized>(bus: &mut B) -> Result<(), Fault<B::Error>> {
    configure(bus)?;
    probe(bus)?;
    let rx = transfer(bus, PROBE)?;
    fault::compare(efspi::RXDATA.addr(), u32::from(PROBE), u32::from(rx))
}

pub fn run<B: RegisterBus + ?Sized>(bus: &mut B) -> Result<StatusWord, B::Error> {
    StatusPort::enable(bus)?;
    StatusPort::report(bus, StatusWord::IDLE)?;
    let outcome = body(bus);
    conclude(bus, outcome, StatusWord::PASS, StatusWord::FAIL)
}
