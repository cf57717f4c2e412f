// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! The status port: the only way a self-test talks to the outside world.
//!
//! Bit 0 of the output says the test finished, the other low bits carry one
//! pass/fail verdict each. Writes show up on the pins immediately once the output
//! enable is set; there is no handshake back.

use crate::mmio::RegisterBus;
use crate::regs::csr;
use bitflags::bitflags;
use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StatusWord(pub u32);

impl StatusWord {
    /// Nothing reported yet.
    pub const IDLE: Self = Self(0);
    /// Finished, peripheral answered correctly.
    pub const PASS: Self = Self(1);
    /// Finished, peripheral answered wrongly.
    pub const FAIL: Self = Self(2);
    /// A check failed and the test stopped at that point.
    pub const HALTED_EARLY: Self = Self(4);
    /// Every fixed-value check passed.
    pub const VERIFIED: Self = Self(5);
    /// Visual ramp shown before a bitmask result is latched.
    pub const RAMP: [Self; 3] = [Self(3), Self(7), Self(15)];

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn completed(self) -> bool {
        self.0 & 1 != 0
    }
}

impl From<u32> for StatusWord {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06b}", self.0)
    }
}

bitflags! {
    /// Verdict of the pattern memory test.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MemoryStatus: u32 {
        const COMPLETED = 1 << 0;
        const OFF_CHIP_OK = 1 << 1;
        const ON_CHIP_OK = 1 << 2;
    }
}

impl From<MemoryStatus> for StatusWord {
    fn from(status: MemoryStatus) -> Self {
        Self(status.bits())
    }
}

/// Handle on the GPI/GPO/GPOE triple of the CSR block.
pub struct StatusPort;

impl StatusPort {
    /// Turns every status pin into an output. Until this runs, GPO writes are
    /// latched but invisible.
    pub fn enable<B: RegisterBus + ?Sized>(bus: &mut B) -> Result<(), B::Error> {
        csr::GPOE.write(bus, csr::ALL_OUTPUTS)
    }

    pub fn report<B: RegisterBus + ?Sized>(bus: &mut B, word: StatusWord) -> Result<(), B::Error> {
        debug!("status port <- {}", word);
        csr::GPO.write(bus, word.bits())
    }

    /// Writes the ramp and then the final word.
    pub fn latch<B: RegisterBus + ?Sized>(bus: &mut B, word: StatusWord) -> Result<(), B::Error> {
        for step in StatusWord::RAMP {
            Self::report(bus, step)?;
        }
        Self::report(bus, word)
    }

    pub fn input<B: RegisterBus + ?Sized>(bus: &mut B) -> Result<u32, B::Error> {
        csr::GPI.read(bus)
    }
}
