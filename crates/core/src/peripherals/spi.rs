// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Basic SPI master. The data register is its own block; configuration and status
//! are CSR words, so the shifter state is shared with [`super::csr::Csr`].

use crate::{Peripheral, SimResult};
use hachure_config::SpiWiring;
use hachure_diag::regs::spi::{SpiConfig, SpiStatus};
use std::sync::{Arc, Mutex};

#[derive(Debug)]
pub struct SpiCore {
    wiring: SpiWiring,
    config: u32,
    shifting: u32,
    received: u32,
    /// Ticks left in the frame in flight, 0 when idle.
    remaining: u32,
    done: bool,
    frames: u64,
}

impl SpiCore {
    pub fn new(wiring: SpiWiring) -> Self {
        Self {
            wiring,
            config: 0,
            shifting: 0,
            received: 0,
            remaining: 0,
            done: false,
            frames: 0,
        }
    }

    pub fn config(&self) -> SpiConfig {
        SpiConfig::from_bits(self.config)
    }

    pub fn config_bits(&self) -> u32 {
        self.config
    }

    pub fn configure(&mut self, bits: u32) {
        self.config = bits;
        tracing::debug!("spi: configured {:?}", self.config());
    }

    pub fn status(&self) -> SpiStatus {
        if self.done {
            SpiStatus::DONE
        } else {
            SpiStatus::empty()
        }
    }

    pub fn is_busy(&self) -> bool {
        self.remaining != 0
    }

    /// Starts a frame from the top bits of `word`. A frame already in flight is
    /// abandoned.
    pub fn start(&mut self, word: u32) {
        let config = self.config();
        let bits = config.frame.bits();
        self.shifting = word.checked_shr(32 - bits).unwrap_or(0);
        self.remaining = bits * (u32::from(config.prescaler) + 1);
        self.done = false;
    }

    pub fn received(&self) -> u32 {
        self.received
    }

    pub fn tick(&mut self) {
        if self.remaining == 0 {
            return;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            let bits = self.config().frame.bits();
            self.received = super::miso(self.wiring, self.shifting, bits);
            self.done = true;
            self.frames += 1;
            tracing::debug!(
                "spi: frame {:#x} done, received {:#x}",
                self.shifting,
                self.received
            );
        }
    }
}

/// The data register: write to transmit, read for the last received frame.
#[derive(Debug)]
pub struct SpiData {
    core: Arc<Mutex<SpiCore>>,
}

impl SpiData {
    pub fn new(core: Arc<Mutex<SpiCore>>) -> Self {
        Self { core }
    }
}

impl Peripheral for SpiData {
    fn read(&mut self, _offset: u32) -> SimResult<u32> {
        Ok(super::lock(&self.core).received())
    }

    fn write(&mut self, _offset: u32, value: u32) -> SimResult<()> {
        super::lock(&self.core).start(value);
        Ok(())
    }

    fn tick(&mut self) {
        super::lock(&self.core).tick();
    }

    fn snapshot(&self) -> serde_json::Value {
        let core = super::lock(&self.core);
        serde_json::json!({
            "config": core.config,
            "busy": core.is_busy(),
            "done": core.done,
            "received": core.received,
            "frames": core.frames,
        })
    }

    fn as_any(&self) -> Option<&dyn std::any::Any> {
        Some(self)
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn std::any::Any> {
        Some(self)
    }
}
