// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::memory::MemorySnapshot;
use crate::Soc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug)]
pub struct SocSnapshot {
    pub name: String,
    pub accesses: u64,
    pub max_accesses: u64,
    pub status: u32,
    pub status_trace: Vec<u32>,
    pub memories: BTreeMap<String, MemorySnapshot>,
    pub peripherals: BTreeMap<String, serde_json::Value>,
}

impl SocSnapshot {
    pub fn capture(soc: &Soc) -> Self {
        let memories = [("rom", &soc.bus.rom), ("sram", &soc.bus.sram), ("ram", &soc.bus.ram)]
            .into_iter()
            .map(|(name, mem)| (name.to_string(), mem.snapshot()))
            .collect();
        let peripherals = soc
            .bus
            .peripherals
            .iter()
            .map(|p| (p.name.clone(), p.dev.snapshot()))
            .collect();

        Self {
            name: soc.name.clone(),
            accesses: soc.accesses(),
            max_accesses: soc.max_accesses(),
            status: soc.status(),
            status_trace: soc.status_trace(),
            memories,
            peripherals,
        }
    }
}
