// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Pattern memory test.
//!
//! Writes [`pattern`] words to a fixed set of offsets in off-chip SRAM and
//! on-chip RAM, then reads every one back. Both memories are written before either
//! is verified, so a decode fault that aliases one onto the other shows up.
//!
//! Status port sequence: `1` (writing), `2` (verifying), ramp, then the verdict
//! bitmask (see [`MemoryStatus`]).

use crate::fault::{self, Fault};
use crate::map::Region;
use crate::mmio::{ReadWrite, Register, RegisterBus};
use crate::pattern::pattern;
use crate::status::{MemoryStatus, StatusPort, StatusWord};

/// Word offsets exercised in each region. All below 4 KiB so the on-chip stack,
/// which grows down from the top of RAM, is left alone.
pub const OFFSETS: [u32; 7] = [0, 211, 256, 511, 512, 1023, 1024];

pub const OFF_CHIP_SEED: u32 = 42;
pub const ON_CHIP_SEED: u32 = 43;

const WRITING: StatusWord = StatusWord(1);
const VERIFYING: StatusWord = StatusWord(2);

/// Which words of a region to exercise and with which seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryPlan<'a> {
    pub region: Region,
    pub seed: u32,
    pub offsets: &'a [u32],
}

pub const OFF_CHIP: MemoryPlan<'static> = MemoryPlan {
    region: Region::Sram,
    seed: OFF_CHIP_SEED,
    offsets: &OFFSETS,
};

pub const ON_CHIP: MemoryPlan<'static> = MemoryPlan {
    region: Region::Ram,
    seed: ON_CHIP_SEED,
    offsets: &OFFSETS,
};

impl MemoryPlan<'_> {
    fn cell(&self, offset: u32) -> Register<ReadWrite> {
        Register::at(self.region, offset)
    }
}

/// Writes the pattern word to every offset of `plan`.
pub fn fill<B: RegisterBus + ?Sized>(bus: &mut B, plan: &MemoryPlan<'_>) -> Result<(), B::Error> {
    for &offset in plan.offsets {
        plan.cell(offset).write(bus, pattern(offset, plan.seed))?;
    }
    Ok(())
}

/// Reads back every offset of `plan`, stopping at the first word that differs.
pub fn verify<B: RegisterBus + ?Sized>(
    bus: &mut B,
    plan: &MemoryPlan<'_>,
) -> Result<(), Fault<B::Error>> {
    for &offset in plan.offsets {
        fault::expect(bus, plan.cell(offset), pattern(offset, plan.seed))?;
    }
    Ok(())
}

/// Verifies both plans independently and folds the verdicts into a bitmask.
pub fn check<B: RegisterBus + ?Sized>(
    bus: &mut B,
    off_chip: &MemoryPlan<'_>,
    on_chip: &MemoryPlan<'_>,
) -> Result<MemoryStatus, B::Error> {
    let mut status = MemoryStatus::COMPLETED;
    for (plan, ok) in [
        (off_chip, MemoryStatus::OFF_CHIP_OK),
        (on_chip, MemoryStatus::ON_CHIP_OK),
    ] {
        match verify(bus, plan) {
            Ok(()) => status |= ok,
            Err(Fault::Mismatch {
                addr,
                expected,
                actual,
            }) => warn!(
                "{}: {:#010x} read {:#010x}, expected {:#010x}",
                plan.region, addr, actual, expected
            ),
            Err(Fault::Bus(err)) => return Err(err),
        }
    }
    Ok(status)
}

/// The whole program on the default plans.
pub fn run<B: RegisterBus + ?Sized>(bus: &mut B) -> Result<StatusWord, B::Error> {
    run_with(bus, &OFF_CHIP, &ON_CHIP)
}

pub fn run_with<B: RegisterBus + ?Sized>(
    bus: &mut B,
    off_chip: &MemoryPlan<'_>,
    on_chip: &MemoryPlan<'_>,
) -> Result<StatusWord, B::Error> {
    StatusPort::enable(bus)?;
    StatusPort::report(bus, WRITING)?;
    fill(bus, off_chip)?;
    fill(bus, on_chip)?;

    StatusPort::report(bus, VERIFYING)?;
    let status = check(bus, off_chip, on_chip)?;
    info!("memory verdict {:?}", status);

    let word = StatusWord::from(status);
    StatusPort::latch(bus, word)?;
    Ok(word)
}
