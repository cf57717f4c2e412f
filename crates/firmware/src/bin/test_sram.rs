// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Pattern test of off-chip SRAM and on-chip RAM. Latches 0b111 when both hold.
#![no_std]
#![no_main]

use hachure_diag::selftest::{self, memory};
use hachure_diag::Mmio;
use panic_halt as _;
use riscv_rt::entry;

#[entry]
fn main() -> ! {
    let Some(mut bus) = Mmio::take() else {
        selftest::halt()
    };
    let _ = memory::run(&mut bus);
    selftest::halt()
}
