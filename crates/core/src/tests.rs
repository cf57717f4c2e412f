// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

#[cfg(test)]
mod tests {
    use crate::bus::SystemBus;
    use crate::{run_self_test, SimulationError, Soc};
    use hachure_config::{SocDescriptor, SpiWiring, StopReason};
    use hachure_diag::regs::efspi as efspi_regs;
    use hachure_diag::selftest::{efspi, memory};
    use hachure_diag::{MemoryStatus, Region, RegisterBus, SelfTest, StatusWord};

    fn soc_with(f: impl FnOnce(&mut SocDescriptor), budget: u64) -> Soc {
        let mut desc = SocDescriptor::default();
        f(&mut desc);
        Soc::from_config(&desc, budget).unwrap()
    }

    #[test]
    fn test_memory_passes_on_healthy_soc() {
        let mut soc = Soc::new(SystemBus::new());
        let report = run_self_test(&mut soc, SelfTest::Memory);

        assert_eq!(report.stop_reason, StopReason::Halted);
        assert_eq!(report.verdict, Some(0b111));
        assert_eq!(report.status_trace, vec![1, 2, 3, 7, 15, 7]);
        assert_eq!(
            soc.bus.sram.read_u32(Region::Sram.word(211)),
            Some(hachure_diag::pattern(211, 42))
        );
    }

    #[test]
    fn test_memory_detects_corrupted_sram_word() {
        let mut soc = Soc::new(SystemBus::new());
        memory::fill(&mut soc, &memory::OFF_CHIP).unwrap();
        memory::fill(&mut soc, &memory::ON_CHIP).unwrap();
        soc.bus.sram.poke(Region::Sram.word(512), 0);

        let status = memory::check(&mut soc, &memory::OFF_CHIP, &memory::ON_CHIP).unwrap();
        assert_eq!(status, MemoryStatus::COMPLETED | MemoryStatus::ON_CHIP_OK);
    }

    #[test]
    fn test_memory_past_end_of_sram_is_a_violation() {
        let mut soc = soc_with(|d| d.memory.sram = "2KiB".to_string(), 10_000);
        let report = run_self_test(&mut soc, SelfTest::Memory);

        assert_eq!(report.stop_reason, StopReason::MemoryViolation);
        assert_eq!(report.verdict, None);
        // Stuck in the write phase
        assert_eq!(report.status_trace, vec![1]);
        assert!(report.error.unwrap().contains("0x10000800"));
    }

    #[test]
    fn test_memory_layout_verifies() {
        let mut soc = Soc::new(SystemBus::new());
        let report = run_self_test(&mut soc, SelfTest::MemoryLayout);
        assert_eq!(report.stop_reason, StopReason::Halted);
        assert_eq!(report.status_trace, vec![0, 5]);
    }

    #[test]
    fn test_spi_loopback_passes() {
        let mut soc = Soc::new(SystemBus::new());
        let report = run_self_test(&mut soc, SelfTest::Spi);
        assert_eq!(report.verdict, Some(1));
        assert_eq!(report.status_trace, vec![0, 1]);
        assert_eq!(report.status, 1);
    }

    #[test]
    fn test_spi_open_line_fails() {
        let mut soc = soc_with(|d| d.wiring.spi = SpiWiring::Open, 10_000);
        let report = run_self_test(&mut soc, SelfTest::Spi);
        assert_eq!(report.stop_reason, StopReason::Halted);
        assert_eq!(report.verdict, Some(2));
        assert_eq!(report.status_trace, vec![0, 2]);
    }

    #[test]
    fn test_spi_waits_for_the_frame() {
        // Four setup accesses, then sixteen ticks of shifting to wait out
        let mut soc = Soc::with_budget(SystemBus::new(), 10);
        let report = run_self_test(&mut soc, SelfTest::Spi);
        assert_eq!(report.stop_reason, StopReason::Stalled);
        assert_eq!(report.status_trace, vec![0]);
        assert_eq!(report.accesses, 10);
    }

    #[test]
    fn test_efspi_loopback_passes() {
        let mut soc = Soc::new(SystemBus::new());
        let report = run_self_test(&mut soc, SelfTest::EfSpi);
        assert_eq!(report.stop_reason, StopReason::Halted);
        assert_eq!(report.status_trace, vec![0, 1]);
        // The busy-wait covers the 88-tick frame
        assert!(report.accesses > 88);
    }

    #[test]
    fn test_efspi_open_line_fails() {
        let mut soc = soc_with(|d| d.wiring.efspi = SpiWiring::Open, 10_000);
        let report = run_self_test(&mut soc, SelfTest::EfSpi);
        assert_eq!(report.status_trace, vec![0, 2]);
    }

    /// Forwards to the SoC but never lets the extended SPI clock gate open.
    struct GateStuck<'a>(&'a mut Soc);

    impl RegisterBus for GateStuck<'_> {
        type Error = SimulationError;

        fn read_word(&mut self, addr: u32) -> Result<u32, SimulationError> {
            self.0.read_word(addr)
        }

        fn write_word(&mut self, addr: u32, value: u32) -> Result<(), SimulationError> {
            if addr == efspi_regs::GCLK.addr() {
                return Ok(());
            }
            self.0.write_word(addr, value)
        }
    }

    #[test]
    fn test_efspi_without_clock_fails() {
        let mut soc = Soc::with_budget(SystemBus::new(), 10_000);
        let verdict = efspi::run(&mut GateStuck(&mut soc)).unwrap();

        assert_eq!(verdict, StatusWord::FAIL);
        assert_eq!(soc.status_trace(), vec![0, 2]);
    }

    #[test]
    fn test_xip_reads_boot_code() {
        let mut soc = Soc::new(SystemBus::new());
        let report = run_self_test(&mut soc, SelfTest::Xip);
        assert_eq!(report.verdict, Some(5));
        assert_eq!(report.status_trace, vec![0, 5]);
    }

    #[test]
    fn test_xip_mismatch_halts_early() {
        let mut soc = soc_with(|d| {
            d.xip.words.insert(36, 0x0000_0513);
        }, 10_000);
        let report = run_self_test(&mut soc, SelfTest::Xip);
        assert_eq!(report.verdict, Some(4));
    }

    #[test]
    fn test_xip_guard_closed_reads_erased() {
        let mut soc = Soc::new(SystemBus::new());
        assert_eq!(soc.read_word(Region::EfXip.word(0)).unwrap(), 0xFFFF_FFFF);
        assert_eq!(
            soc.write_word(Region::EfXip.word(0), 0),
            Err(SimulationError::ReadOnly(0x7000_0000))
        );
    }

    #[test]
    fn test_uart_echoes_every_byte() {
        let input: Vec<u8> = (0..=255).collect();
        let mut soc = Soc::with_budget(SystemBus::new(), 400_000);
        soc.queue_uart_input(&input);

        let report = run_self_test(&mut soc, SelfTest::Uart);
        assert_eq!(report.stop_reason, StopReason::Stalled);
        assert_eq!(report.verdict, None);
        assert_eq!(report.uart_tx, input);
        // The status port is never touched
        assert!(report.status_trace.is_empty());
    }

    #[test]
    fn test_uart_idle_line() {
        let mut soc = Soc::with_budget(SystemBus::new(), 5_000);
        let report = run_self_test(&mut soc, SelfTest::Uart);
        assert_eq!(report.stop_reason, StopReason::Stalled);
        assert!(report.uart_tx.is_empty());
    }

    #[test]
    fn test_heartbeat_toggles() {
        let mut soc = Soc::with_budget(SystemBus::new(), 2_000);
        let report = run_self_test(&mut soc, SelfTest::Heartbeat);
        assert_eq!(report.stop_reason, StopReason::Stalled);
        assert!(report.toggles() > 10, "only {} toggles", report.toggles());
    }

    #[test]
    fn test_budget_is_exact() {
        let mut soc = Soc::with_budget(SystemBus::new(), 2);
        soc.read_word(Region::Ram.word(0)).unwrap();
        soc.read_word(Region::Ram.word(0)).unwrap();
        assert_eq!(
            soc.read_word(Region::Ram.word(0)),
            Err(SimulationError::Stalled(2))
        );
        assert_eq!(soc.accesses(), 2);
    }

    #[test]
    fn test_snapshot_covers_every_block() {
        let mut soc = Soc::new(SystemBus::new());
        run_self_test(&mut soc, SelfTest::Spi);
        let snapshot = soc.snapshot();

        assert_eq!(snapshot.status, 1);
        for name in ["uart", "spi", "csr", "efspi", "xip"] {
            assert!(snapshot.peripherals.contains_key(name), "missing {}", name);
        }
        assert_eq!(snapshot.peripherals["spi"]["received"], 0x1D);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"sram\""));
    }
}
