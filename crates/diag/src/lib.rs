// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Register-level bring-up diagnostics for the Hachure SoC.
//!
//! Every self-test drives its peripheral through a [`RegisterBus`]. On silicon that
//! bus is [`Mmio`], a volatile view of the physical address map; on the host it is
//! the simulated system bus from `hachure-core`. The self-tests never see the
//! difference, so the exact register sequence exercised in simulation is the one
//! the firmware issues.
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log;

pub mod fault;
pub mod map;
pub mod mmio;
pub mod pattern;
pub mod regs;
pub mod selftest;
pub mod status;
pub mod wait;

#[cfg(test)]
pub(crate) mod testing;

pub use fault::Fault;
pub use map::Region;
pub use mmio::{Mmio, ReadOnly, ReadWrite, Register, RegisterBus, WriteOnly};
pub use pattern::pattern;
pub use selftest::SelfTest;
pub use status::{MemoryStatus, StatusPort, StatusWord};
