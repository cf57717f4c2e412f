// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Blocking handshakes.

use crate::mmio::{Readable, Register, RegisterBus};

/// Re-reads `reg` until `done` accepts its value and returns that value.
///
/// There is no deadline. A peripheral that never answers keeps the caller here
/// forever, which an observer sees as a status port that stops changing. On a
/// simulated bus the loop ends when the bus reports an error.
pub fn until<B, A, F>(bus: &mut B, reg: Register<A>, mut done: F) -> Result<u32, B::Error>
where
    B: RegisterBus + ?Sized,
    A: Readable,
    F: FnMut(u32) -> bool,
{
    loop {
        let value = reg.read(bus)?;
        if done(value) {
            return Ok(value);
        }
        core::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Region;
    use crate::mmio::ReadOnly;
    use crate::testing::RecordingBus;

    const FLAG: Register<ReadOnly> = Register::at(Region::Csr, 11);

    #[test]
    fn test_returns_first_accepted_value() {
        let mut bus = RecordingBus::new();
        bus.poke(FLAG.addr(), 0b100);
        assert_eq!(until(&mut bus, FLAG, |v| v & 0b100 != 0), Ok(0b100));
        assert_eq!(bus.log().len(), 1);
    }

    #[test]
    fn test_spins_until_the_bus_gives_up() {
        let mut bus = RecordingBus::with_budget(50);
        assert!(until(&mut bus, FLAG, |v| v != 0).is_err());
        assert_eq!(bus.log().len(), 50);
    }
}
