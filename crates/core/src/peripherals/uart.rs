// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::{Peripheral, SimResult};
use hachure_diag::regs::uart::{self, UartCtrl};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

const RXDATA: u32 = uart::RXDATA.offset();
const TXDATA: u32 = uart::TXDATA.offset();
const PR: u32 = uart::PR.offset();
const CTRL: u32 = uart::CTRL.offset();
const CFG: u32 = uart::CFG.offset();
const RX_FIFO_LEVEL: u32 = uart::RX_FIFO_LEVEL.offset();
const TX_FIFO_LEVEL: u32 = uart::TX_FIFO_LEVEL.offset();
const GCLK: u32 = uart::GCLK.offset();

const FIFO_DEPTH: usize = uart::FIFO_DEPTH as usize;

/// Extended-peripheral UART.
///
/// Bytes queued by the host arrive on the RX line one per tick while the receiver
/// is enabled and the RX FIFO has room. Transmitted bytes leave the TX FIFO one
/// character time apart, where a character time is its bit count times
/// `prescaler + 1` ticks, and go to the attached sink.
#[derive(Debug)]
pub struct EfUart {
    clock_hz: u32,
    clocked: bool,
    ctrl: UartCtrl,
    cfg: u32,
    prescaler: u32,
    line_in: VecDeque<u8>,
    rx: VecDeque<u8>,
    tx: VecDeque<u8>,
    /// Byte on the wire and ticks until it is out.
    shifting: Option<(u8, u32)>,
    loopback_wired: bool,
    sink: Option<Arc<Mutex<Vec<u8>>>>,
    sent: u64,
}

impl EfUart {
    pub fn new(clock_hz: u32, loopback_wired: bool) -> Self {
        Self {
            clock_hz,
            clocked: false,
            ctrl: UartCtrl::empty(),
            cfg: 0,
            prescaler: 0,
            line_in: VecDeque::new(),
            rx: VecDeque::new(),
            tx: VecDeque::new(),
            shifting: None,
            loopback_wired,
            sink: None,
            sent: 0,
        }
    }

    pub fn queue_input(&mut self, bytes: &[u8]) {
        self.line_in.extend(bytes);
    }

    pub fn set_sink(&mut self, sink: Arc<Mutex<Vec<u8>>>) {
        self.sink = Some(sink);
    }

    pub fn pending_input(&self) -> usize {
        self.line_in.len()
    }

    fn data_bits(&self) -> u32 {
        match self.cfg & uart::CFG_WLEN_MASK {
            w @ 5..=9 => w,
            _ => 8,
        }
    }

    /// Start bit, data, optional parity, stop bits.
    fn frame_bits(&self) -> u32 {
        let parity = u32::from(self.cfg & uart::CFG_PARITY_MASK != 0);
        let stop = if self.cfg & uart::CFG_STOP2 != 0 { 2 } else { 1 };
        1 + self.data_bits() + parity + stop
    }

    fn char_ticks(&self) -> u32 {
        self.frame_bits()
            .saturating_mul(self.prescaler.saturating_add(1))
    }

    fn loopback(&self) -> bool {
        self.loopback_wired || self.ctrl.contains(UartCtrl::LOOPBACK)
    }

    fn read_reg(&mut self, offset: u32) -> u32 {
        if !self.clocked && offset != GCLK {
            return 0;
        }
        match offset {
            RXDATA => self.rx.pop_front().map(u32::from).unwrap_or(0),
            PR => self.prescaler,
            CTRL => self.ctrl.bits(),
            CFG => self.cfg,
            RX_FIFO_LEVEL => self.rx.len() as u32,
            TX_FIFO_LEVEL => self.tx.len() as u32,
            GCLK => u32::from(self.clocked),
            _ => 0,
        }
    }

    fn write_reg(&mut self, offset: u32, value: u32) {
        if !self.clocked && offset != GCLK {
            tracing::warn!(
                "uart: write of {:#x} to word {} while the clock is gated",
                value,
                offset
            );
            return;
        }
        match offset {
            TXDATA => {
                if self.tx.len() < FIFO_DEPTH {
                    self.tx.push_back((value & 0xFF) as u8);
                } else {
                    tracing::warn!("uart: TX FIFO full, dropped {:#04x}", value & 0xFF);
                }
            }
            PR => {
                self.prescaler = value;
                let divisor = u64::from(value) * 8 + 8;
                tracing::debug!(
                    "uart: prescaler {} gives {} baud at {} Hz",
                    value,
                    u64::from(self.clock_hz) / divisor,
                    self.clock_hz
                );
            }
            CTRL => self.ctrl = UartCtrl::from_bits_truncate(value),
            CFG => self.cfg = value,
            GCLK => self.clocked = value & 1 != 0,
            _ => {}
        }
    }

    fn tick_tx(&mut self) {
        if let Some((byte, remaining)) = self.shifting.take() {
            if remaining > 1 {
                self.shifting = Some((byte, remaining - 1));
                return;
            }
            self.sent += 1;
            tracing::debug!("uart: TX {:#04x}", byte);
            if let Some(sink) = &self.sink {
                super::lock(sink).push(byte);
            }
            if self.loopback() {
                self.line_in.push_back(byte);
            }
        }
        if self.ctrl.contains(UartCtrl::TX_ENABLE) {
            if let Some(byte) = self.tx.pop_front() {
                self.shifting = Some((byte, self.char_ticks()));
            }
        }
    }

    fn tick_rx(&mut self) {
        if self.ctrl.contains(UartCtrl::RX_ENABLE) && self.rx.len() < FIFO_DEPTH {
            if let Some(byte) = self.line_in.pop_front() {
                self.rx.push_back(byte);
            }
        }
    }
}

impl Peripheral for EfUart {
    fn read(&mut self, offset: u32) -> SimResult<u32> {
        Ok(self.read_reg(offset))
    }

    fn write(&mut self, offset: u32, value: u32) -> SimResult<()> {
        self.write_reg(offset, value);
        Ok(())
    }

    fn tick(&mut self) {
        if !self.clocked || !self.ctrl.contains(UartCtrl::ENABLE) {
            return;
        }
        self.tick_tx();
        self.tick_rx();
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "clocked": self.clocked,
            "ctrl": self.ctrl.bits(),
            "cfg": self.cfg,
            "prescaler": self.prescaler,
            "rx_level": self.rx.len(),
            "tx_level": self.tx.len(),
            "pending_input": self.line_in.len(),
            "sent": self.sent,
        })
    }

    fn as_any(&self) -> Option<&dyn std::any::Any> {
        Some(self)
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn std::any::Any> {
        Some(self)
    }
}
