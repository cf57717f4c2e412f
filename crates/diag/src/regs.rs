// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Register maps of the blocks the self-tests touch.
//!
//! Offsets are word offsets inside the owning [`Region`]. The UART and extended SPI
//! blocks share one vendor layout: data and configuration at the bottom, FIFO
//! levels at byte `0xFE00`, interrupt and clock-gate registers at byte `0xFF00`.

use crate::map::Region;
use crate::mmio::{ReadOnly, ReadWrite, Register, WriteOnly};
use bitflags::bitflags;

/// Control/status register block.
pub mod csr {
    use super::*;

    /// General-purpose input vector.
    pub const GPI: Register<ReadOnly> = Register::at(Region::Csr, 0);
    /// General-purpose output vector: the status port.
    pub const GPO: Register<WriteOnly> = Register::at(Region::Csr, 1);
    /// Output enable, one bit per GPO pin.
    pub const GPOE: Register<ReadWrite> = Register::at(Region::Csr, 2);
    /// Basic SPI configuration, see [`SpiConfig`](super::spi::SpiConfig).
    pub const SPI_CONFIG: Register<ReadWrite> = Register::at(Region::Csr, 7);
    /// Basic SPI status, see [`SpiStatus`](super::spi::SpiStatus).
    pub const SPI_STATUS: Register<ReadOnly> = Register::at(Region::Csr, 11);
    /// Gate in front of the flash execute-in-place window.
    pub const XIP_GUARD: Register<ReadWrite> = Register::at(Region::Csr, 12);

    /// GPOE value that turns every status pin into an output.
    pub const ALL_OUTPUTS: u32 = 0xFF;
}

/// Basic SPI master.
pub mod spi {
    use super::*;

    /// Transmit on write, received frame on read.
    pub const DATA: Register<ReadWrite> = Register::at(Region::Spi, 0);

    bitflags! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct SpiStatus: u32 {
            /// Set once the frame started by the last data write has been shifted.
            const DONE = 1 << 2;
        }
    }

    /// Frame length in bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[repr(u32)]
    pub enum FrameSize {
        Bits8 = 0,
        Bits16 = 1,
        Bits32 = 2,
    }

    impl FrameSize {
        pub const fn from_field(field: u32) -> Self {
            match field & 0b11 {
                0 => FrameSize::Bits8,
                1 => FrameSize::Bits16,
                _ => FrameSize::Bits32,
            }
        }

        pub const fn bits(self) -> u32 {
            match self {
                FrameSize::Bits8 => 8,
                FrameSize::Bits16 => 16,
                FrameSize::Bits32 => 32,
            }
        }
    }

    /// Contents of [`csr::SPI_CONFIG`](super::csr::SPI_CONFIG).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SpiConfig {
        /// Clock divider, 4 bits.
        pub prescaler: u8,
        /// Idle-high clock, sampled on the opposite edge.
        pub clock_inverted: bool,
        /// Let the data write drive chip-select.
        pub auto_cs: bool,
        pub frame: FrameSize,
    }

    impl SpiConfig {
        const PRESCALER_MASK: u32 = 0xF;
        const CLOCK_INVERTED: u32 = 1 << 4;
        const AUTO_CS: u32 = 1 << 5;
        const FRAME_SHIFT: u32 = 6;

        pub const fn bits(self) -> u32 {
            (self.prescaler as u32 & Self::PRESCALER_MASK)
                | if self.clock_inverted { Self::CLOCK_INVERTED } else { 0 }
                | if self.auto_cs { Self::AUTO_CS } else { 0 }
                | (self.frame as u32) << Self::FRAME_SHIFT
        }

        pub const fn from_bits(bits: u32) -> Self {
            Self {
                prescaler: (bits & Self::PRESCALER_MASK) as u8,
                clock_inverted: bits & Self::CLOCK_INVERTED != 0,
                auto_cs: bits & Self::AUTO_CS != 0,
                frame: FrameSize::from_field(bits >> Self::FRAME_SHIFT),
            }
        }
    }
}

/// Extended-peripheral SPI master.
pub mod efspi {
    use super::*;

    pub const RXDATA: Register<ReadOnly> = Register::at(Region::EfSpi, 0);
    pub const TXDATA: Register<WriteOnly> = Register::at(Region::EfSpi, 1);
    pub const CFG: Register<ReadWrite> = Register::at(Region::EfSpi, 2);
    pub const CTRL: Register<ReadWrite> = Register::at(Region::EfSpi, 3);
    pub const PR: Register<ReadWrite> = Register::at(Region::EfSpi, 4);
    pub const STATUS: Register<ReadOnly> = Register::at(Region::EfSpi, 5);
    /// Clock gate. Nothing else in the block is clocked until this is set.
    pub const GCLK: Register<ReadWrite> = Register::at(Region::EfSpi, 16324);

    bitflags! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct EfSpiCfg: u32 {
            const CPOL = 1 << 0;
            const CPHA = 1 << 1;
        }
    }

    bitflags! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct EfSpiCtrl: u32 {
            /// Drive chip-select low.
            const SELECT = 1 << 0;
            const ENABLE = 1 << 1;
            const RX_ENABLE = 1 << 2;
        }
    }

    bitflags! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct EfSpiStatus: u32 {
            const TX_EMPTY = 1 << 0;
            const TX_FULL = 1 << 1;
            /// Busy until a received frame is waiting; clears on completion,
            /// the opposite sense of the basic core's `DONE`.
            const RX_EMPTY = 1 << 2;
            const RX_FULL = 1 << 3;
        }
    }
}

/// Extended-peripheral UART.
pub mod uart {
    use super::*;

    pub const RXDATA: Register<ReadOnly> = Register::at(Region::Uart, 0);
    pub const TXDATA: Register<WriteOnly> = Register::at(Region::Uart, 1);
    pub const PR: Register<ReadWrite> = Register::at(Region::Uart, 2);
    pub const CTRL: Register<ReadWrite> = Register::at(Region::Uart, 3);
    pub const CFG: Register<ReadWrite> = Register::at(Region::Uart, 4);
    pub const RX_FIFO_LEVEL: Register<ReadOnly> = Register::at(Region::Uart, 0xFE00 / 4);
    pub const TX_FIFO_LEVEL: Register<ReadOnly> = Register::at(Region::Uart, 0xFE10 / 4);
    pub const GCLK: Register<ReadWrite> = Register::at(Region::Uart, 0xFF10 / 4);

    /// Entries in each of the TX and RX FIFOs.
    pub const FIFO_DEPTH: u32 = 16;

    bitflags! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct UartCtrl: u32 {
            const ENABLE = 1 << 0;
            const TX_ENABLE = 1 << 1;
            const RX_ENABLE = 1 << 2;
            const LOOPBACK = 1 << 3;
            const GLITCH_FILTER = 1 << 4;
        }
    }

    pub const CFG_WLEN_MASK: u32 = 0xF;
    pub const CFG_STOP2_SHIFT: u32 = 4;
    pub const CFG_STOP2: u32 = 1 << CFG_STOP2_SHIFT;
    pub const CFG_PARITY_SHIFT: u32 = 5;
    pub const CFG_PARITY_MASK: u32 = 0b111 << CFG_PARITY_SHIFT;
    pub const CFG_TIMEOUT_SHIFT: u32 = 8;
    pub const CFG_TIMEOUT_MASK: u32 = 0x3F << CFG_TIMEOUT_SHIFT;
}
