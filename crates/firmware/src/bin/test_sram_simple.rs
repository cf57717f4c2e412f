// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Fixed-value memory test: 5 on success, 4 at the first bad word.
#![no_std]
#![no_main]

use hachure_diag::selftest::{self, layout};
use hachure_diag::Mmio;
use panic_halt as _;
use riscv_rt::entry;

#[entry]
fn main() -> ! {
    let Some(mut bus) = Mmio::take() else {
        selftest::halt()
    };
    let _ = layout::run(&mut bus);
    selftest::halt()
}
