// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Why a self-test step stopped early.

use crate::mmio::{Readable, Register, RegisterBus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Fault<E> {
    /// A word read back differently from what the test expected.
    #[error("mismatch at {addr:#010x}: expected {expected:#010x}, read {actual:#010x}")]
    Mismatch { addr: u32, expected: u32, actual: u32 },
    /// The bus itself failed. Never happens on silicon.
    #[error("bus error: {0}")]
    Bus(E),
}

impl<E> From<E> for Fault<E> {
    fn from(err: E) -> Self {
        Fault::Bus(err)
    }
}

/// Compares an already-read value against `expected`.
pub fn compare<E>(addr: u32, expected: u32, actual: u32) -> Result<(), Fault<E>> {
    if actual == expected {
        Ok(())
    } else {
        Err(Fault::Mismatch {
            addr,
            expected,
            actual,
        })
    }
}

/// Reads `reg` once and compares it against `expected`.
pub fn expect<B, A>(bus: &mut B, reg: Register<A>, expected: u32) -> Result<(), Fault<B::Error>>
where
    B: RegisterBus + ?Sized,
    A: Readable,
{
    let actual = reg.read(bus)?;
    compare(reg.addr(), expected, actual)
}
