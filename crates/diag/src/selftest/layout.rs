// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Fixed-value memory test.
//!
//! The first memory check run on new silicon: hand-picked words at offsets that
//! straddle the 2 KiB and 4 KiB boundaries of both memories. Any wrong word stops
//! the test with [`StatusWord::HALTED_EARLY`]; a clean pass reports
//! [`StatusWord::VERIFIED`].

use crate::fault::{self, Fault};
use crate::map::Region;
use crate::mmio::{ReadWrite, Register, RegisterBus};
use crate::selftest::conclude;
use crate::status::{StatusPort, StatusWord};

/// `(word offset, value)` pairs written to off-chip SRAM.
pub const SRAM_WORDS: [(u32, u32); 5] = [
    (10, 0xFF00_FF00),
    (511, 0xA523_AAAD),
    (512, 0xCAFE_CAFE),
    (1023, 0x1234_5678),
    (1024, 0x871A_2192),
];

/// `(word offset, value)` pairs written to on-chip RAM.
pub const RAM_WORDS: [(u32, u32); 5] = [
    (10, 0x8127_122D),
    (511, 0x2389_13DE),
    (512, 0xDEED_AADE),
    (1023, 0x2372_3721),
    (1024, 0xABCD_1234),
];

const CASES: [(Region, &[(u32, u32)]); 2] = [(Region::Sram, &SRAM_WORDS), (Region::Ram, &RAM_WORDS)];

fn cell(region: Region, offset: u32) -> Register<ReadWrite> {
    Register::at(region, offset)
}

fn body<B: RegisterBus + ?Sized>(bus: &mut B) -> Result<(), Fault<B::Error>> {
    for (region, words) in CASES {
        for &(offset, value) in words {
            cell(region, offset).write(bus, value)?;
        }
    }
    for (region, words) in CASES {
        for &(offset, value) in words {
            fault::expect(bus, cell(region, offset), value)?;
        }
    }
    Ok(())
}

pub fn run<B: RegisterBus + ?Sized>(bus: &mut B) -> Result<StatusWord, B::Error> {
    StatusPort::enable(bus)?;
    StatusPort::report(bus, StatusWord::IDLE)?;
    let outcome = body(bus);
    conclude(bus, outcome, StatusWord::VERIFIED, StatusWord::HALTED_EARLY)
}
