// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::{Peripheral, SimResult, SimulationError};
use hachure_diag::map::Region;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Value of an erased flash word, and of every read through a closed guard.
pub const ERASED: u32 = 0xFFFF_FFFF;
pub const NOP: u32 = 0x0000_0013;
/// Words of `nop` before the register-clearing sequence of the boot code.
pub const BOOT_NOPS: usize = 28;

/// `addi x<rd>, x0, 0`
const fn clear_reg(rd: u32) -> u32 {
    (rd << 7) | NOP
}

/// Read-only window onto the boot flash, behind the CSR guard.
#[derive(Debug)]
pub struct XipWindow {
    image: Vec<u32>,
    guard: Arc<AtomicBool>,
    closed_reads: u64,
}

impl XipWindow {
    pub fn new(image: Vec<u32>, guard: Arc<AtomicBool>) -> Self {
        Self {
            image,
            guard,
            closed_reads: 0,
        }
    }

    /// Flash image of `words` words: a run of `nop`, then `li x1..x31, 0`, then
    /// erased flash. `overrides` replace individual words.
    pub fn boot_image(words: usize, overrides: &BTreeMap<u32, u32>) -> Vec<u32> {
        let mut image: Vec<u32> = (0..words)
            .map(|i| match i {
                i if i < BOOT_NOPS => NOP,
                i if i - BOOT_NOPS < 31 => clear_reg((i - BOOT_NOPS + 1) as u32),
                _ => ERASED,
            })
            .collect();
        for (&offset, &value) in overrides {
            if let Some(word) = image.get_mut(offset as usize) {
                *word = value;
            }
        }
        image
    }
}

impl Peripheral for XipWindow {
    fn read(&mut self, offset: u32) -> SimResult<u32> {
        if !self.guard.load(Ordering::SeqCst) {
            if self.closed_reads == 0 {
                tracing::warn!("xip: read of word {} with the guard closed", offset);
            }
            self.closed_reads += 1;
            return Ok(ERASED);
        }
        Ok(self.image.get(offset as usize).copied().unwrap_or(ERASED))
    }

    fn write(&mut self, offset: u32, _value: u32) -> SimResult<()> {
        Err(SimulationError::ReadOnly(Region::EfXip.word(offset)))
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "guard": self.guard.load(Ordering::SeqCst),
            "size": self.image.len() * 4,
            "closed_reads": self.closed_reads,
        })
    }

    fn as_any(&self) -> Option<&dyn std::any::Any> {
        Some(self)
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn std::any::Any> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boot_image_layout() {
        let image = XipWindow::boot_image(64, &BTreeMap::new());
        assert_eq!(image[0], NOP);
        assert_eq!(image[10], NOP);
        assert_eq!(image[28], 0x93); // li ra, 0
        assert_eq!(image[36], 0x493); // li s1, 0
        assert_eq!(image[58], 0xF93); // li t6, 0
        assert_eq!(image[59], ERASED);
    }

    #[test]
    fn test_overrides_apply() {
        let overrides = BTreeMap::from([(10, 0xDEAD_BEEF), (500, 1)]);
        let image = XipWindow::boot_image(64, &overrides);
        assert_eq!(image[10], 0xDEAD_BEEF);
        assert_eq!(image.len(), 64);
    }

    #[test]
    fn test_guard_controls_reads() {
        let guard = Arc::new(AtomicBool::new(false));
        let mut xip = XipWindow::new(XipWindow::boot_image(64, &BTreeMap::new()), guard.clone());
        assert_eq!(xip.read(28).unwrap(), ERASED);
        guard.store(true, Ordering::SeqCst);
        assert_eq!(xip.read(28).unwrap(), 0x93);
        assert_eq!(xip.read(1000).unwrap(), ERASED);
    }

    #[test]
    fn test_window_is_read_only() {
        let mut xip = XipWindow::new(vec![NOP; 4], Arc::new(AtomicBool::new(true)));
        assert_eq!(xip.write(1, 0), Err(SimulationError::ReadOnly(0x7000_0004)));
    }
}
