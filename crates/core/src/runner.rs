// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::{SimResult, SimulationError, Soc};
use hachure_config::StopReason;
use hachure_diag::selftest::{efspi, heartbeat, layout, memory, spi, uart, xip};
use hachure_diag::{SelfTest, StatusWord};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::info;

/// What a self-test left behind when the simulation stopped.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub test: String,
    pub stop_reason: StopReason,
    /// Word the program latched, if it got that far.
    pub verdict: Option<u32>,
    /// Value on the status pins when the run stopped.
    pub status: u32,
    pub status_trace: Vec<u32>,
    pub uart_tx: Vec<u8>,
    pub accesses: u64,
    pub error: Option<String>,
}

impl RunReport {
    pub fn uart_text(&self) -> String {
        String::from_utf8_lossy(&self.uart_tx).into_owned()
    }

    /// Changes of level on status bit 0 over the run.
    pub fn toggles(&self) -> usize {
        self.status_trace
            .iter()
            .scan(0, |level, word| {
                let flipped = word & 1 != *level;
                *level = word & 1;
                Some(flipped)
            })
            .filter(|flipped| *flipped)
            .count()
    }
}

pub fn stop_reason(err: &SimulationError) -> StopReason {
    match err {
        SimulationError::Stalled(_) => StopReason::Stalled,
        SimulationError::MemoryViolation(_) | SimulationError::ReadOnly(_) => {
            StopReason::MemoryViolation
        }
    }
}

fn execute(soc: &mut Soc, test: SelfTest) -> SimResult<StatusWord> {
    match test {
        SelfTest::Memory => memory::run(soc),
        SelfTest::MemoryLayout => layout::run(soc),
        SelfTest::Spi => spi::run(soc),
        SelfTest::EfSpi => efspi::run(soc),
        SelfTest::Xip => xip::run(soc),
        SelfTest::Uart => match uart::serve(soc)? {},
        SelfTest::Heartbeat => match heartbeat::serve(soc)? {},
    }
}

/// Runs `test` on `soc` until it latches a verdict or the bus gives up.
///
/// A terminating program that returns is parked in its idle loop on silicon; here
/// that is [`StopReason::Halted`]. Programs that serve forever always end in
/// [`StopReason::Stalled`] once the access budget is spent.
pub fn run_self_test(soc: &mut Soc, test: SelfTest) -> RunReport {
    let sink = Arc::new(Mutex::new(Vec::new()));
    soc.attach_uart_sink(sink.clone());

    info!(
        "Running self-test '{}' on {} (budget {} accesses)",
        test,
        soc.name,
        soc.max_accesses()
    );
    let (stop_reason, verdict, error) = match execute(soc, test) {
        Ok(word) => {
            info!("'{}' latched {}", test, word);
            (StopReason::Halted, Some(word.bits()), None)
        }
        Err(e) => {
            let reason = stop_reason(&e);
            if reason == StopReason::Stalled && !test.terminates() {
                info!("'{}' served until the budget ran out", test);
            } else {
                tracing::warn!("'{}' stopped: {}", test, e);
            }
            (reason, None, Some(e.to_string()))
        }
    };

    let uart_tx = crate::peripherals::lock(&sink).clone();
    RunReport {
        test: test.name().to_string(),
        stop_reason,
        verdict,
        status: soc.status(),
        status_trace: soc.status_trace(),
        uart_tx,
        accesses: soc.accesses(),
        error,
    }
}
