// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use hachure_diag::map::WORD_BYTES;
use serde::{Deserialize, Serialize};

/// A simple flat word-addressed memory
#[derive(Debug, Clone)]
pub struct LinearMemory {
    pub data: Vec<u32>,
    pub base_addr: u32,
    pub read_only: bool,
}

/// Outcome of a store into a [`LinearMemory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Store {
    Done,
    ReadOnly,
    OutOfRange,
}

impl LinearMemory {
    pub fn new(size_bytes: usize, base_addr: u32) -> Self {
        Self {
            data: vec![0; size_bytes / WORD_BYTES as usize],
            base_addr,
            read_only: false,
        }
    }

    pub fn rom(size_bytes: usize, base_addr: u32) -> Self {
        Self {
            read_only: true,
            ..Self::new(size_bytes, base_addr)
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64 * WORD_BYTES as u64
    }

    fn index(&self, addr: u32) -> Option<usize> {
        let offset = addr.checked_sub(self.base_addr)?;
        if offset % WORD_BYTES != 0 {
            return None;
        }
        let index = (offset / WORD_BYTES) as usize;
        (index < self.data.len()).then_some(index)
    }

    pub fn read_u32(&self, addr: u32) -> Option<u32> {
        self.index(addr).map(|i| self.data[i])
    }

    pub fn write_u32(&mut self, addr: u32, value: u32) -> Store {
        match self.index(addr) {
            Some(_) if self.read_only => Store::ReadOnly,
            Some(i) => {
                self.data[i] = value;
                Store::Done
            }
            None => Store::OutOfRange,
        }
    }

    /// Overwrites a word regardless of `read_only`, for image loading and fault
    /// injection from the host.
    pub fn poke(&mut self, addr: u32, value: u32) -> bool {
        match self.index(addr) {
            Some(i) => {
                self.data[i] = value;
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            base: self.base_addr,
            size: self.size_bytes(),
            read_only: self.read_only,
            nonzero_words: self.data.iter().filter(|w| **w != 0).count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemorySnapshot {
    pub base: u32,
    pub size: u64,
    pub read_only: bool,
    pub nonzero_words: usize,
}
