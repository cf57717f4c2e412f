// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod csr;
pub mod efspi;
pub mod spi;
pub mod uart;
pub mod xip;

use hachure_config::SpiWiring;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// What comes back on MISO for a frame of `bits` that sent `sent`.
pub(crate) fn miso(wiring: SpiWiring, sent: u32, bits: u32) -> u32 {
    let mask = if bits >= 32 { u32::MAX } else { (1 << bits) - 1 };
    match wiring {
        SpiWiring::Loopback => sent & mask,
        // Pulled high
        SpiWiring::Open => mask,
    }
}

/// Locks shared peripheral state. A panic elsewhere cannot leave register state
/// half-written, so a poisoned lock is still usable.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
