// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! The self-test programs.
//!
//! Each module is one standalone program: configure the block, stimulate it,
//! observe the answer, report on the status port. Programs that finish return the
//! word they latched; the caller then parks in [`halt`]. Programs that never finish
//! (`uart`, `heartbeat`) return only if the bus fails, hence `Result<Infallible, _>`.

pub mod efspi;
pub mod heartbeat;
pub mod layout;
pub mod memory;
pub mod spi;
pub mod uart;
pub mod xip;

use crate::fault::Fault;
use crate::mmio::RegisterBus;
use crate::status::{StatusPort, StatusWord};
use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelfTest {
    /// Pattern write/verify of off-chip SRAM and on-chip RAM.
    Memory,
    /// Fixed-value write/verify of both memories.
    MemoryLayout,
    /// Loopback through the basic SPI core.
    Spi,
    /// Loopback through the extended SPI core.
    EfSpi,
    /// Byte echo on the UART.
    Uart,
    /// Known instruction words through the guarded flash window.
    Xip,
    /// Square wave on status bit 0.
    Heartbeat,
}

impl SelfTest {
    pub const ALL: [SelfTest; 7] = [
        SelfTest::Memory,
        SelfTest::MemoryLayout,
        SelfTest::Spi,
        SelfTest::EfSpi,
        SelfTest::Uart,
        SelfTest::Xip,
        SelfTest::Heartbeat,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            SelfTest::Memory => "memory",
            SelfTest::MemoryLayout => "memory_layout",
            SelfTest::Spi => "spi",
            SelfTest::EfSpi => "efspi",
            SelfTest::Uart => "uart",
            SelfTest::Xip => "xip",
            SelfTest::Heartbeat => "heartbeat",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// False for the programs that loop forever instead of latching a verdict.
    pub const fn terminates(self) -> bool {
        !matches!(self, SelfTest::Uart | SelfTest::Heartbeat)
    }
}

impl fmt::Display for SelfTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Turns the outcome of a test body into the word to latch: `pass` when every
/// check held, `fail` on the first mismatch. Bus errors pass through untouched.
pub(crate) fn conclude<B: RegisterBus + ?Sized>(
    bus: &mut B,
    outcome: Result<(), Fault<B::Error>>,
    pass: StatusWord,
    fail: StatusWord,
) -> Result<StatusWord, B::Error> {
    let word = match outcome {
        Ok(()) => pass,
        Err(Fault::Mismatch {
            addr,
            expected,
            actual,
        }) => {
            warn!(
                "check failed at {:#010x}: expected {:#010x}, read {:#010x}",
                addr, expected, actual
            );
            fail
        }
        Err(Fault::Bus(err)) => return Err(err),
    };
    StatusPort::report(bus, word)?;
    Ok(word)
}

/// Terminal idle loop. Every program ends here; there is nothing after it.
pub fn halt() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
