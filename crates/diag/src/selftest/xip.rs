// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Execute-in-place window check.
//!
//! The boot sequence in flash starts with a known run of instructions, so the
//! words at a few offsets of the XIP window are known in advance. With the guard
//! open they must read back exactly; with it closed the window returns unrelated
//! data, which is why the guard goes up before the first read.

use crate::fault::{self, Fault};
use crate::map::Region;
use crate::mmio::{ReadOnly, Register, RegisterBus};
use crate::regs::csr;
use crate::selftest::conclude;
use crate::status::{StatusPort, StatusWord};

/// `(word offset, instruction)` pairs placed by the boot code.
pub const EXPECTED: [(u32, u32); 4] = [
    (0, 0x0000_0013),  // nop
    (10, 0x0000_0013), // nop
    (28, 0x0000_0093), // li ra, 0
    (36, 0x0000_0493), // li s1, 0
];

pub fn open_guard<B: RegisterBus + ?Sized>(bus: &mut B) -> Result<(), B::Error> {
    csr::XIP_GUARD.write(bus, 1)
}

fn body<B: RegisterBus + ?Sized>(bus: &mut B) -> Result<(), Fault<B::Error>> {
    open_guard(bus)?;
    for (offset, insn) in EXPECTED {
        fault::expect(bus, Register::<ReadOnly>::at(Region::EfXip, offset), insn)?;
    }
    Ok(())
}

/// [`StatusWord::VERIFIED`] if all four words match, [`StatusWord::HALTED_EARLY`]
/// at the first one that does not.
pub fn run<B: RegisterBus + ?Sized>(bus: &mut B) -> Result<StatusWord, B::Error> {
    StatusPort::enable(bus)?;
    StatusPort::report(bus, StatusWord::IDLE)?;
    let outcome = body(bus);
    conclude(bus, outcome, StatusWord::VERIFIED, StatusWord::HALTED_EARLY)
}
