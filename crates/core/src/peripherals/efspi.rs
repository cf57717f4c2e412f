// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Extended-peripheral SPI master.
//!
//! Nothing in the block responds until the clock gate is set: reads return 0 and
//! writes are dropped. Frames are taken from the TX FIFO while CTRL.ENABLE is set;
//! a frame already shifting completes even if ENABLE drops, and its byte lands in
//! the RX FIFO when RX was enabled at the start of the frame.

use crate::{Peripheral, SimResult};
use hachure_config::SpiWiring;
use hachure_diag::regs::efspi::{self, EfSpiCtrl, EfSpiStatus};
use std::collections::VecDeque;

const RXDATA: u32 = efspi::RXDATA.offset();
const TXDATA: u32 = efspi::TXDATA.offset();
const CFG: u32 = efspi::CFG.offset();
const CTRL: u32 = efspi::CTRL.offset();
const PR: u32 = efspi::PR.offset();
const STATUS: u32 = efspi::STATUS.offset();
const GCLK: u32 = efspi::GCLK.offset();

pub const FIFO_DEPTH: usize = 16;
const FRAME_BITS: u32 = 8;

#[derive(Debug, Clone, Copy)]
struct Frame {
    byte: u8,
    remaining: u32,
    capture: bool,
}

#[derive(Debug)]
pub struct EfSpi {
    wiring: SpiWiring,
    clocked: bool,
    cfg: u32,
    ctrl: EfSpiCtrl,
    prescaler: u32,
    tx: VecDeque<u8>,
    rx: VecDeque<u8>,
    frame: Option<Frame>,
}

impl EfSpi {
    pub fn new(wiring: SpiWiring) -> Self {
        Self {
            wiring,
            clocked: false,
            cfg: 0,
            ctrl: EfSpiCtrl::empty(),
            prescaler: 0,
            tx: VecDeque::new(),
            rx: VecDeque::new(),
            frame: None,
        }
    }

    pub fn status(&self) -> EfSpiStatus {
        let mut status = EfSpiStatus::empty();
        status.set(EfSpiStatus::TX_EMPTY, self.tx.is_empty());
        status.set(EfSpiStatus::TX_FULL, self.tx.len() >= FIFO_DEPTH);
        status.set(EfSpiStatus::RX_EMPTY, self.rx.is_empty());
        status.set(EfSpiStatus::RX_FULL, self.rx.len() >= FIFO_DEPTH);
        status
    }

    fn read_reg(&mut self, offset: u32) -> u32 {
        if !self.clocked && offset != GCLK {
            return 0;
        }
        match offset {
            RXDATA => self.rx.pop_front().map(u32::from).unwrap_or(0),
            CFG => self.cfg,
            CTRL => self.ctrl.bits(),
            PR => self.prescaler,
            STATUS => self.status().bits(),
            GCLK => u32::from(self.clocked),
            _ => 0,
        }
    }

    fn write_reg(&mut self, offset: u32, value: u32) {
        if !self.clocked && offset != GCLK {
            tracing::warn!(
                "efspi: write of {:#x} to word {} while the clock is gated",
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
                    tracing::warn!("efspi: TX FIFO full, dropped {:#04x}", value & 0xFF);
                }
            }
            CFG => self.cfg = value,
            CTRL => self.ctrl = EfSpiCtrl::from_bits_truncate(value),
            PR => self.prescaler = value,
            GCLK => self.clocked = value & 1 != 0,
            _ => {}
        }
    }
}

impl Peripheral for EfSpi {
    fn read(&mut self, offset: u32) -> SimResult<u32> {
        Ok(self.read_reg(offset))
    }

    fn write(&mut self, offset: u32, value: u32) -> SimResult<()> {
        self.write_reg(offset, value);
        Ok(())
    }

    fn tick(&mut self) {
        if !self.clocked {
            return;
        }
        if let Some(mut frame) = self.frame.take() {
            frame.remaining -= 1;
            if frame.remaining > 0 {
                self.frame = Some(frame);
                return;
            }
            let received = super::miso(self.wiring, u32::from(frame.byte), FRAME_BITS) as u8;
            tracing::debug!("efspi: sent {:#04x}, received {:#04x}", frame.byte, received);
            if frame.capture && self.rx.len() < FIFO_DEPTH {
                self.rx.push_back(received);
            }
        }
        if self.ctrl.contains(EfSpiCtrl::ENABLE) {
            if let Some(byte) = self.tx.pop_front() {
                self.frame = Some(Frame {
                    byte,
                    remaining: FRAME_BITS.saturating_mul(self.prescaler.saturating_add(1)),
                    capture: self.ctrl.contains(EfSpiCtrl::RX_ENABLE),
                });
            }
        }
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "clocked": self.clocked,
            "cfg": self.cfg,
            "ctrl": self.ctrl.bits(),
            "prescaler": self.prescaler,
            "status": self.status().bits(),
            "tx_level": self.tx.len(),
            "rx_level": self.rx.len(),
        })
    }

    fn as_any(&self) -> Option<&dyn std::any::Any> {
        Some(self)
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn std::any::Any> {
        Some(self)
    }
}
