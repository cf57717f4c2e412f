// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Word-granular register access.
//!
//! A [`Register`] is a typed handle on one 32-bit word of the address map. Its
//! access marker decides which of `read`/`write` exist, so writing a status
//! register or reading an output latch does not compile. The handle does not touch
//! hardware on its own: every access goes through a [`RegisterBus`].

use crate::map::Region;
use core::convert::Infallible;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicBool, Ordering};

/// Something that can carry 32-bit reads and writes to physical addresses.
///
/// Accesses must reach the target in program order, and none may be merged,
/// dropped or served from a cache.
pub trait RegisterBus {
    type Error;

    fn read_word(&mut self, addr: u32) -> Result<u32, Self::Error>;
    fn write_word(&mut self, addr: u32, value: u32) -> Result<(), Self::Error>;
}

/// Volatile access to the physical address map of the running chip.
///
/// Only one instance is handed out per boot (see [`Mmio::take`]); it lives for the
/// rest of the program because the program never exits.
#[derive(Debug)]
pub struct Mmio {
    _private: (),
}

static TAKEN: AtomicBool = AtomicBool::new(false);

impl Mmio {
    /// Returns the bus capability the first time it is called, `None` afterwards.
    ///
    /// Execution is single-threaded and interrupt-free, so a plain load/store pair
    /// is enough and the check works on cores without atomic read-modify-write.
    pub fn take() -> Option<Self> {
        if TAKEN.load(Ordering::Relaxed) {
            return None;
        }
        TAKEN.store(true, Ordering::Relaxed);
        Some(Self { _private: () })
    }
}

impl RegisterBus for Mmio {
    type Error = Infallible;

    #[inline(always)]
    fn read_word(&mut self, addr: u32) -> Result<u32, Infallible> {
        // SAFETY: every address handed to the bus comes from `Region::word`, which
        // yields word-aligned addresses inside the fixed map of the chip.
        Ok(unsafe { core::ptr::read_volatile(addr as usize as *const u32) })
    }

    #[inline(always)]
    fn write_word(&mut self, addr: u32, value: u32) -> Result<(), Infallible> {
        // SAFETY: see `read_word`.
        unsafe { core::ptr::write_volatile(addr as usize as *mut u32, value) };
        Ok(())
    }
}

/// How software may touch a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Status the hardware updates; writes are meaningless.
    ReadOnly,
    /// Command or output latch; reads return nothing useful.
    WriteOnly,
    /// Configuration.
    ReadWrite,
}

pub trait Access {
    const MODE: AccessMode;
}
pub trait Readable: Access {}
pub trait Writable: Access {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOnly {}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOnly {}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadWrite {}

impl Access for ReadOnly {
    const MODE: AccessMode = AccessMode::ReadOnly;
}
impl Access for WriteOnly {
    const MODE: AccessMode = AccessMode::WriteOnly;
}
impl Access for ReadWrite {
    const MODE: AccessMode = AccessMode::ReadWrite;
}
impl Readable for ReadOnly {}
impl Readable for ReadWrite {}
impl Writable for WriteOnly {}
impl Writable for ReadWrite {}

/// One 32-bit word of the address map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Register<A> {
    region: Region,
    offset: u32,
    _access: PhantomData<A>,
}

impl<A: Access> Register<A> {
    pub const fn at(region: Region, offset: u32) -> Self {
        Self {
            region,
            offset,
            _access: PhantomData,
        }
    }

    pub const fn offset(&self) -> u32 {
        self.offset
    }

    pub const fn addr(&self) -> u32 {
        self.region.word(self.offset)
    }

    pub const fn mode(&self) -> AccessMode {
        A::MODE
    }
}

impl<A: Readable> Register<A> {
    #[inline]
    pub fn read<B: RegisterBus + ?Sized>(&self, bus: &mut B) -> Result<u32, B::Error> {
        bus.read_word(self.addr())
    }
}

impl<A: Writable> Register<A> {
    #[inline]
    pub fn write<B: RegisterBus + ?Sized>(&self, bus: &mut B, value: u32) -> Result<(), B::Error> {
        bus.write_word(self.addr(), value)
    }
}

impl Register<ReadWrite> {
    /// Read-modify-write.
    pub fn modify<B, F>(&self, bus: &mut B, f: F) -> Result<(), B::Error>
    where
        B: RegisterBus + ?Sized,
        F: FnOnce(u32) -> u32,
    {
        let value = self.read(bus)?;
        self.write(bus, f(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Access as Op, RecordingBus};

    #[test]
    fn test_register_addresses() {
        let guard = Register::<ReadWrite>::at(Region::Csr, 12);
        assert_eq!(guard.addr(), 0x5000_0030);
        assert_eq!(guard.mode(), AccessMode::ReadWrite);
        assert_eq!(Register::<ReadOnly>::at(Region::Csr, 0).mode(), AccessMode::ReadOnly);
    }

    #[test]
    fn test_modify_reads_then_writes() {
        let mut bus = RecordingBus::new();
        let reg = Register::<ReadWrite>::at(Region::Uart, 3);
        bus.poke(reg.addr(), 0b0001);
        reg.modify(&mut bus, |v| v | 0b0100).unwrap();

        assert_eq!(bus.peek(reg.addr()), 0b0101);
        assert_eq!(
            bus.log(),
            &[Op::Read(reg.addr(), 0b0001), Op::Write(reg.addr(), 0b0101)]
        );
    }

    #[test]
    fn test_take_hands_out_a_single_capability() {
        let first = Mmio::take();
        assert!(first.is_some());
        assert!(Mmio::take().is_none());
    }
}
