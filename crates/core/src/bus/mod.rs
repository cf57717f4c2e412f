// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::memory::{LinearMemory, Store};
use crate::peripherals::csr::Csr;
use crate::peripherals::efspi::EfSpi;
use crate::peripherals::spi::{SpiCore, SpiData};
use crate::peripherals::uart::EfUart;
use crate::peripherals::xip::XipWindow;
use crate::{Peripheral, SimResult, SimulationError};
use anyhow::Context;
use hachure_config::{SocDescriptor, SpiWiring};
use hachure_diag::map::{Region, REGION_SPAN, WORD_BYTES};
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

pub const CSR_SIZE: u32 = 0x40;
pub const SPI_SIZE: u32 = WORD_BYTES;
/// Register file of the vendor blocks, up to and including the clock gate.
pub const EF_BLOCK_SIZE: u32 = 0x1_0000;

#[derive(Debug)]
pub struct PeripheralEntry {
    pub name: String,
    pub base: u32,
    pub size: u32,
    pub dev: Box<dyn Peripheral>,
}

pub struct SystemBus {
    pub rom: LinearMemory,
    pub sram: LinearMemory,
    pub ram: LinearMemory,
    pub peripherals: Vec<PeripheralEntry>,
}

impl Default for SystemBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemBus {
    pub fn new() -> Self {
        let defaults = SocDescriptor::default();
        let image = XipWindow::boot_image(1024, &BTreeMap::new());
        Self::assemble(
            LinearMemory::rom(16 * 1024, Region::Rom.base()),
            LinearMemory::new(8 * 1024, Region::Sram.base()),
            LinearMemory::new(8 * 1024, Region::Ram.base()),
            &defaults,
            image,
        )
    }

    pub fn from_config(soc: &SocDescriptor) -> anyhow::Result<Self> {
        let rom = region_size("rom", &soc.memory.rom)?;
        let sram = region_size("sram", &soc.memory.sram)?;
        let ram = region_size("ram", &soc.memory.ram)?;
        let xip = region_size("xip", &soc.xip.size)?;

        for &offset in soc.xip.words.keys() {
            if u64::from(offset) * u64::from(WORD_BYTES) >= xip as u64 {
                anyhow::bail!(
                    "XIP override at word {} lies outside the {} byte image",
                    offset,
                    xip
                );
            }
        }

        let image = XipWindow::boot_image(xip / WORD_BYTES as usize, &soc.xip.words);
        Ok(Self::assemble(
            LinearMemory::rom(rom, Region::Rom.base()),
            LinearMemory::new(sram, Region::Sram.base()),
            LinearMemory::new(ram, Region::Ram.base()),
            soc,
            image,
        ))
    }

    fn assemble(
        rom: LinearMemory,
        sram: LinearMemory,
        ram: LinearMemory,
        soc: &SocDescriptor,
        image: Vec<u32>,
    ) -> Self {
        let spi_core = Arc::new(Mutex::new(SpiCore::new(soc.wiring.spi)));
        let xip_guard = Arc::new(AtomicBool::new(false));
        let xip_size = image.len() as u32 * WORD_BYTES;

        let mut bus = Self {
            rom,
            sram,
            ram,
            peripherals: Vec::new(),
        };
        bus.attach(
            "uart",
            Region::Uart,
            EF_BLOCK_SIZE,
            Box::new(EfUart::new(soc.clock_hz, soc.wiring.uart_loopback)),
        );
        bus.attach(
            "spi",
            Region::Spi,
            SPI_SIZE,
            Box::new(SpiData::new(spi_core.clone())),
        );
        bus.attach(
            "csr",
            Region::Csr,
            CSR_SIZE,
            Box::new(Csr::new(soc.gpi, spi_core, xip_guard.clone())),
        );
        bus.attach(
            "efspi",
            Region::EfSpi,
            EF_BLOCK_SIZE,
            Box::new(EfSpi::new(soc.wiring.efspi)),
        );
        bus.attach(
            "xip",
            Region::EfXip,
            xip_size,
            Box::new(XipWindow::new(image, xip_guard)),
        );

        if soc.wiring.spi == SpiWiring::Open || soc.wiring.efspi == SpiWiring::Open {
            tracing::info!(
                "SPI wiring: spi={:?}, efspi={:?}",
                soc.wiring.spi,
                soc.wiring.efspi
            );
        }
        bus
    }

    fn attach(&mut self, name: &str, region: Region, size: u32, dev: Box<dyn Peripheral>) {
        self.peripherals.push(PeripheralEntry {
            name: name.to_string(),
            base: region.base(),
            size,
            dev,
        });
    }

    pub fn find<T: 'static>(&self, name: &str) -> Option<&T> {
        self.peripherals
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.dev.as_any())
            .and_then(|any| any.downcast_ref::<T>())
    }

    pub fn find_mut<T: 'static>(&mut self, name: &str) -> Option<&mut T> {
        self.peripherals
            .iter_mut()
            .find(|p| p.name == name)
            .and_then(|p| p.dev.as_any_mut())
            .and_then(|any| any.downcast_mut::<T>())
    }

    pub fn memory(&self, region: Region) -> Option<&LinearMemory> {
        match region {
            Region::Rom => Some(&self.rom),
            Region::Sram => Some(&self.sram),
            Region::Ram => Some(&self.ram),
            _ => None,
        }
    }

    pub fn memory_mut(&mut self, region: Region) -> Option<&mut LinearMemory> {
        match region {
            Region::Rom => Some(&mut self.rom),
            Region::Sram => Some(&mut self.sram),
            Region::Ram => Some(&mut self.ram),
            _ => None,
        }
    }

    fn peripheral_at(&mut self, region: Region, addr: u32) -> Option<(&mut PeripheralEntry, u32)> {
        let offset = region.word_offset(addr);
        self.peripherals
            .iter_mut()
            .find(|p| p.base == region.base())
            .filter(|p| offset < p.size / WORD_BYTES)
            .map(|p| (p, offset))
    }

    pub fn read_u32(&mut self, addr: u32) -> SimResult<u32> {
        if addr % WORD_BYTES != 0 {
            return Err(SimulationError::MemoryViolation(addr));
        }
        let region = Region::decode(addr).ok_or(SimulationError::MemoryViolation(addr))?;
        if let Some(mem) = self.memory(region) {
            return mem.read_u32(addr).ok_or(SimulationError::MemoryViolation(addr));
        }
        match self.peripheral_at(region, addr) {
            Some((p, offset)) => p.dev.read(offset),
            None => Err(SimulationError::MemoryViolation(addr)),
        }
    }

    pub fn write_u32(&mut self, addr: u32, value: u32) -> SimResult<()> {
        if addr % WORD_BYTES != 0 {
            return Err(SimulationError::MemoryViolation(addr));
        }
        let region = Region::decode(addr).ok_or(SimulationError::MemoryViolation(addr))?;
        if let Some(mem) = self.memory_mut(region) {
            return match mem.write_u32(addr, value) {
                Store::Done => Ok(()),
                Store::ReadOnly => Err(SimulationError::ReadOnly(addr)),
                Store::OutOfRange => Err(SimulationError::MemoryViolation(addr)),
            };
        }
        match self.peripheral_at(region, addr) {
            Some((p, offset)) => p.dev.write(offset, value),
            None => Err(SimulationError::MemoryViolation(addr)),
        }
    }

    pub fn tick_peripherals(&mut self) {
        for p in self.peripherals.iter_mut() {
            p.dev.tick();
        }
    }
}

fn region_size(name: &str, size: &str) -> anyhow::Result<usize> {
    let bytes = hachure_config::parse_size(size)
        .with_context(|| format!("Invalid {} size '{}'", name, size))?;
    if bytes == 0 || bytes > u64::from(REGION_SPAN) {
        anyhow::bail!("{} size {} does not fit its {:#x} byte region", name, bytes, REGION_SPAN);
    }
    if bytes % u64::from(WORD_BYTES) != 0 {
        anyhow::bail!("{} size {} is not a whole number of words", name, bytes);
    }
    Ok(bytes as usize)
}
