//! Simulator: owns the CPU, the cycle counter and the run policy.
//!
//! The driver keeps everything that is not machine state out of `Cpu`: the
//! cycle count, the evaluation-order RNG, the cycle cap and the statistics.

use tracing::{trace, warn};

use crate::common::constants::{CYCLE_CAP_EXIT_CODE, NUM_REGS};
use crate::common::error::SimError;
use crate::config::Config;
use crate::core::Cpu;
use crate::core::cpu::FIXED_ORDER;
use crate::sim::loader::ProgramImage;
use crate::sim::shuffle::XorShift64;
use crate::stats::SimStats;

/// Top-level simulator.
#[derive(Debug)]
pub struct Simulator {
    cpu: Cpu,
    cycles: u64,
    rng: Option<XorShift64>,
    max_cycles: u64,
    stats: SimStats,
}

impl Simulator {
    /// Builds a simulator with `image` loaded into a fresh RAM.
    pub fn new(config: &Config, image: &ProgramImage) -> Self {
        let ram = image.to_ram(config.memory.size_bytes);
        Self {
            cpu: Cpu::new(config, ram),
            cycles: 0,
            rng: config
                .general
                .shuffle
                .then(|| XorShift64::new(config.general.shuffle_seed)),
            max_cycles: config.general.max_cycles,
            stats: SimStats::default(),
        }
    }

    /// Advances the simulator by one clock cycle.
    ///
    /// # Errors
    ///
    /// Any protocol fault raised by a unit.
    pub fn tick(&mut self) -> Result<(), SimError> {
        let mut order = FIXED_ORDER;
        if let Some(rng) = &mut self.rng {
            rng.shuffle(&mut order);
        }
        trace!(cycle = self.cycles, ?order, "tick");
        self.cpu.step(&order)?;
        self.cycles += 1;

        let csu = self.cpu.csu().outputs();
        self.stats.observe(
            &csu,
            self.cpu.rs().outputs().request.is_some(),
            self.cpu.lsq().outputs().request.is_some(),
        );
        Ok(())
    }

    /// Runs until the halt sentinel commits and returns its exit code.
    ///
    /// If a cycle cap is configured and reached first, returns 255.
    ///
    /// # Errors
    ///
    /// The first protocol fault raised by any unit.
    pub fn run(&mut self) -> Result<u8, SimError> {
        loop {
            if let Some(code) = self.cpu.halt_code() {
                return Ok(code);
            }
            if self.max_cycles != 0 && self.cycles >= self.max_cycles {
                warn!(cycles = self.cycles, "cycle cap reached without halt");
                return Ok(CYCLE_CAP_EXIT_CODE);
            }
            self.tick()?;
        }
    }

    /// Committed value of register `idx`.
    pub fn register(&self, idx: usize) -> u32 {
        self.cpu.regfile().value(idx)
    }

    /// Committed RAM byte at `addr`, if in range.
    pub fn read_byte(&self, addr: u32) -> Option<u8> {
        self.cpu.ram().read_byte(addr)
    }

    /// Cycles simulated so far.
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Statistics gathered so far.
    pub const fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// The simulated processor.
    pub const fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// All committed register values, x0 first.
    pub fn registers(&self) -> [u32; NUM_REGS] {
        std::array::from_fn(|i| self.register(i))
    }
}
