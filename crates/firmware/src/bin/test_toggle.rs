// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Heartbeat on status bit 0. Never returns.
#![no_std]
#![no_main]

use hachure_diag::selftest::{self, heartbeat};
use hachure_diag::Mmio;
use panic_halt as _;
use riscv_rt::entry;

#[entry]
fn main() -> ! {
    let Some(mut bus) = Mmio::take() else {
        selftest::halt()
    };
    match heartbeat::serve(&mut bus) {
        Ok(never) | Err(never) => match never {},
    }
}
