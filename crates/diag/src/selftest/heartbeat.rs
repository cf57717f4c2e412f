// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Square wave on status bit 0: proof of life before any peripheral is trusted.

use crate::mmio::RegisterBus;
use crate::status::{StatusPort, StatusWord};
use core::convert::Infallible;

/// GPI reads spent between two edges.
pub const DELAY_READS: u32 = 32;

/// Current output level of bit 0.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Heartbeat {
    high: bool,
}

impl Heartbeat {
    pub const fn new() -> Self {
        Self { high: false }
    }

    pub const fn is_high(&self) -> bool {
        self.high
    }

    /// Flips bit 0, then burns `DELAY_READS` bus reads.
    pub fn beat<B: RegisterBus + ?Sized>(&mut self, bus: &mut B) -> Result<(), B::Error> {
        self.high = !self.high;
        StatusPort::report(bus, StatusWord(u32::from(self.high)))?;
        for _ in 0..DELAY_READS {
            StatusPort::input(bus)?;
        }
        Ok(())
    }
}

/// The whole program. Only returns if the bus fails.
pub fn serve<B: RegisterBus + ?Sized>(bus: &mut B) -> Result<Infallible, B::Error> {
    StatusPort::enable(bus)?;
    let mut heartbeat = Heartbeat::new();
    loop {
        heartbeat.beat(bus)?;
    }
}
