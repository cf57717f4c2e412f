// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! UART byte echo.
//!
//! Configures the channel for 8N1 at a fixed baud rate, then forever waits for a
//! byte and sends it straight back. The status port is not used; the bench checks
//! the echoed byte on the TX pin.

use crate::mmio::RegisterBus;
use crate::regs::uart::{self, UartCtrl};
use crate::wait;
use core::convert::Infallible;

/// Core clock the prescaler is derived from.
pub const CLOCK_HZ: u32 = 100_000_000;
pub const BAUD_RATE: u32 = 115_200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Parity {
    None = 0,
    Odd = 1,
    Even = 2,
    StickyZero = 4,
    StickyOne = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartConfig {
    pub data_bits: u32,
    pub two_stop_bits: bool,
    pub parity: Parity,
    /// Receive timeout in bit times, 0 disables it.
    pub timeout_bits: u32,
    pub prescaler: u32,
}

impl UartConfig {
    /// 8N1, no timeout, at `baud` from `clock_hz`.
    pub const fn eight_n_one(clock_hz: u32, baud: u32) -> Self {
        Self {
            data_bits: 8,
            two_stop_bits: false,
            parity: Parity::None,
            timeout_bits: 0,
            prescaler: prescaler(clock_hz, baud),
        }
    }
}

pub const CONFIG: UartConfig = UartConfig::eight_n_one(CLOCK_HZ, BAUD_RATE);

/// `baud = clock / ((prescaler + 1) * 8)`, solved for the prescaler.
///
/// Combinations that do not divide evenly are truncated; the resulting baud error
/// is not checked. A baud rate of zero, or one too fast for the clock, yields 0.
pub const fn prescaler(clock_hz: u32, baud: u32) -> u32 {
    match baud.checked_mul(8) {
        Some(divisor) => match clock_hz.checked_div(divisor) {
            Some(ticks) => ticks.saturating_sub(1),
            None => 0,
        },
        None => 0,
    }
}

fn set_ctrl<B: RegisterBus + ?Sized>(bus: &mut B, flag: UartCtrl, on: bool) -> Result<(), B::Error> {
    uart::CTRL.modify(bus, |v| if on { v | flag.bits() } else { v & !flag.bits() })
}

fn set_cfg<B: RegisterBus + ?Sized>(
    bus: &mut B,
    mask: u32,
    shift: u32,
    value: u32,
) -> Result<(), B::Error> {
    uart::CFG.modify(bus, |v| (v & !mask) | ((value << shift) & mask))
}

pub fn configure<B: RegisterBus + ?Sized>(bus: &mut B, config: &UartConfig) -> Result<(), B::Error> {
    uart::GCLK.write(bus, 1)?;
    set_ctrl(bus, UartCtrl::ENABLE, true)?;
    set_ctrl(bus, UartCtrl::RX_ENABLE, true)?;
    set_ctrl(bus, UartCtrl::TX_ENABLE, true)?;
    set_ctrl(bus, UartCtrl::LOOPBACK, false)?;
    set_ctrl(bus, UartCtrl::GLITCH_FILTER, false)?;

    set_cfg(bus, uart::CFG_WLEN_MASK, 0, config.data_bits)?;
    set_cfg(
        bus,
        uart::CFG_STOP2,
        uart::CFG_STOP2_SHIFT,
        u32::from(config.two_stop_bits),
    )?;
    set_cfg(
        bus,
        uart::CFG_PARITY_MASK,
        uart::CFG_PARITY_SHIFT,
        config.parity as u32,
    )?;
    set_cfg(
        bus,
        uart::CFG_TIMEOUT_MASK,
        uart::CFG_TIMEOUT_SHIFT,
        config.timeout_bits,
    )?;
    uart::PR.write(bus, config.prescaler)
}

/// Blocks until a byte is in the RX FIFO and pops it.
pub fn read_char<B: RegisterBus + ?Sized>(bus: &mut B) -> Result<u8, B::Error> {
    wait::until(bus, uart::RX_FIFO_LEVEL, |level| level != 0)?;
    Ok((uart::RXDATA.read(bus)? & 0xFF) as u8)
}

/// Blocks until the TX FIFO has room and queues `byte`.
pub fn write_char<B: RegisterBus + ?Sized>(bus: &mut B, byte: u8) -> Result<(), B::Error> {
    wait::until(bus, uart::TX_FIFO_LEVEL, |level| level < uart::FIFO_DEPTH)?;
    uart::TXDATA.write(bus, u32::from(byte))
}

/// One receive-then-transmit round. Returns the byte that went through.
pub fn echo_once<B: RegisterBus + ?Sized>(bus: &mut B) -> Result<u8, B::Error> {
    let byte = read_char(bus)?;
    write_char(bus, byte)?;
    debug!("uart: echoed {:#04x}", byte);
    Ok(byte)
}

/// The whole program. Only returns if the bus fails.
pub fn serve<B: RegisterBus + ?Sized>(bus: &mut B) -> Result<Infallible, B::Error> {
    configure(bus, &CONFIG)?;
    info!("uart: echo at {} baud, prescaler {}", BAUD_RATE, CONFIG.prescaler);
    loop {
        echo_once(bus)?;
    }
}
