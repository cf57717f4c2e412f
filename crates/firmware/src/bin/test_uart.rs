// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! UART echo at 115200 8N1. Never returns.
#![no_std]
#![no_main]

use hachure_diag::selftest::{self, uart};
use hachure_diag::Mmio;
use panic_halt as _;
use riscv_rt::entry;

#[entry]
fn main() -> ! {
    let Some(mut bus) = Mmio::take() else {
        selftest::halt()
    };
    match uart::serve(&mut bus) {
        Ok(never) | Err(never) => match never {},
    }
}
