// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Basic SPI loopback: 1 when the probe byte comes back, 2 otherwise.
#![no_std]
#![no_main]

use hachure_diag::selftest::{self, spi};
use hachure_diag::Mmio;
use panic_halt as _;
use riscv_rt::entry;

#[entry]
fn main() -> ! {
    let Some(mut bus) = Mmio::take() else {
        selftest::halt()
    };
    let _ = spi::run(&mut bus);
    selftest::halt()
}
