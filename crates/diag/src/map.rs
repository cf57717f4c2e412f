// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Physical address map of the SoC.
//!
//! The 32-bit address space is cut into eight 256 MiB regions selected by the top
//! nibble of the address. Every location inside a region is a 32-bit word and is
//! addressed as `base + word_offset * 4`.

use core::fmt;

/// Width in bytes of every mapped location.
pub const WORD_BYTES: u32 = 4;

/// Size of the address window reserved for each region.
pub const REGION_SPAN: u32 = 0x1000_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum Region {
    /// Boot ROM.
    Rom = 0x0000_0000,
    /// Off-chip SRAM.
    Sram = 0x1000_0000,
    /// On-chip RAM, holds the program stack.
    Ram = 0x2000_0000,
    Uart = 0x3000_0000,
    /// Basic SPI data register. Configuration and status live in the CSR block.
    Spi = 0x4000_0000,
    /// Control/status registers.
    Csr = 0x5000_0000,
    /// Extended-peripheral SPI register block.
    EfSpi = 0x6000_0000,
    /// Extended-peripheral flash execute-in-place window (read-only).
    EfXip = 0x7000_0000,
}

impl Region {
    pub const ALL: [Region; 8] = [
        Region::Rom,
        Region::Sram,
        Region::Ram,
        Region::Uart,
        Region::Spi,
        Region::Csr,
        Region::EfSpi,
        Region::EfXip,
    ];

    pub const fn base(self) -> u32 {
        self as u32
    }

    pub const fn name(self) -> &'static str {
        match self {
            Region::Rom => "rom",
            Region::Sram => "sram",
            Region::Ram => "ram",
            Region::Uart => "uart",
            Region::Spi => "spi",
            Region::Csr => "csr",
            Region::EfSpi => "ef_spi",
            Region::EfXip => "ef_xip",
        }
    }

    /// Physical address of the word at `offset`.
    ///
    /// Offsets past the end of the region are a programming error and are not
    /// checked: register space has no protection to fall back on.
    pub const fn word(self, offset: u32) -> u32 {
        self.base().wrapping_add(offset.wrapping_mul(WORD_BYTES))
    }

    /// Recovers the region from the top nibble of `addr`.
    pub const fn decode(addr: u32) -> Option<Region> {
        match addr >> 28 {
            0 => Some(Region::Rom),
            1 => Some(Region::Sram),
            2 => Some(Region::Ram),
            3 => Some(Region::Uart),
            4 => Some(Region::Spi),
            5 => Some(Region::Csr),
            6 => Some(Region::EfSpi),
            7 => Some(Region::EfXip),
            _ => None,
        }
    }

    /// Word offset of `addr` inside this region. Addresses below the base wrap
    /// to offsets past any real register.
    pub const fn word_offset(self, addr: u32) -> u32 {
        addr.wrapping_sub(self.base()) / WORD_BYTES
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#010x}", self.name(), self.base())
    }
}
