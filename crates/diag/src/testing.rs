// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! In-crate test double: a sparse word store that records every access.

use crate::mmio::RegisterBus;
use std::collections::HashMap;
use std::vec::Vec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read(u32, u32),
    Write(u32, u32),
}

/// Returned once the access budget is spent, standing in for a hung handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("access budget exhausted")]
pub struct Exhausted;

type Hook = Box<dyn FnMut(u32, &mut HashMap<u32, u32>)>;

pub struct RecordingBus {
    words: HashMap<u32, u32>,
    log: Vec<Access>,
    budget: usize,
    on_write: Option<Hook>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self {
            words: HashMap::new(),
            log: Vec::new(),
            budget: 100_000,
            on_write: None,
        }
    }

    pub fn with_budget(budget: usize) -> Self {
        Self {
            budget,
            ..Self::new()
        }
    }

    /// Runs `hook` after every write, with the written address and the store.
    pub fn on_write(mut self, hook: impl FnMut(u32, &mut HashMap<u32, u32>) + 'static) -> Self {
        self.on_write = Some(Box::new(hook));
        self
    }

    pub fn poke(&mut self, addr: u32, value: u32) {
        self.words.insert(addr, value);
    }

    pub fn peek(&self, addr: u32) -> u32 {
        self.words.get(&addr).copied().unwrap_or(0)
    }

    pub fn log(&self) -> &[Access] {
        &self.log
    }

    pub fn writes_to(&self, addr: u32) -> Vec<u32> {
        self.log
            .iter()
            .filter_map(|a| match *a {
                Access::Write(a, v) if a == addr => Some(v),
                _ => None,
            })
            .collect()
    }

    fn spend(&mut self) -> Result<(), Exhausted> {
        if self.budget == 0 {
            return Err(Exhausted);
        }
        self.budget -= 1;
        Ok(())
    }
}

impl RegisterBus for RecordingBus {
    type Error = Exhausted;

    fn read_word(&mut self, addr: u32) -> Result<u32, Exhausted> {
        self.spend()?;
        let value = self.peek(addr);
        self.log.push(Access::Read(addr, value));
        Ok(value)
    }

    fn write_word(&mut self, addr: u32, value: u32) -> Result<(), Exhausted> {
        self.spend()?;
        self.words.insert(addr, value);
        self.log.push(Access::Write(addr, value));
        if let Some(hook) = self.on_write.as_mut() {
            hook(addr, &mut self.words);
        }
        Ok(())
    }
}
