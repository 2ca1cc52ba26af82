//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics for a run. It provides:
//! 1. **Cycle and IPC:** Total cycles, retired instructions, and derived metrics (CPI, IPC).
//! 2. **Instruction mix:** Retired counts by category (ALU, branch, jump, load, store).
//! 3. **Speculation:** Pipeline flushes caused by mispredicted control flow.
//! 4. **Stalls:** Issue stall cycles broken down by cause.
//! 5. **Execution:** Requests dispatched to the ALU and to memory.
//!
//! Counters are sampled from the signals every unit publishes at the end of a
//! tick, so collecting them never perturbs the simulation.

use std::time::Instant;

use crate::core::bus::{CsuOutputs, StallCause};
use crate::isa::{ExecUnit, Opcode};

/// Simulation statistics structure tracking all performance metrics.
#[derive(Clone, Debug)]
pub struct SimStats {
    start_time: Instant,
    /// Total simulator cycles elapsed.
    pub cycles: u64,
    /// Number of instructions committed (retired).
    pub instructions_retired: u64,

    /// Count of ALU (arithmetic, logic, shift, lui/auipc, halt) instructions retired.
    pub inst_alu: u64,
    /// Count of conditional branches retired.
    pub inst_branch: u64,
    /// Count of jal/jalr retired.
    pub inst_jump: u64,
    /// Count of loads retired.
    pub inst_load: u64,
    /// Count of stores retired.
    pub inst_store: u64,

    /// Flushes triggered by a committed mismatch.
    pub flushes: u64,

    /// Issue stalls: reorder buffer full.
    pub stalls_rob_full: u64,
    /// Issue stalls: reservation station full.
    pub stalls_rs_full: u64,
    /// Issue stalls: load/store queue full.
    pub stalls_lsq_full: u64,
    /// Issue stalls: waiting for a jalr target.
    pub stalls_jalr: u64,
    /// Issue stalls: undecodable word on the speculated path.
    pub stalls_fetch: u64,

    /// Requests dispatched to the ALU.
    pub alu_ops: u64,
    /// Requests submitted to memory.
    pub mem_ops: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_retired: 0,
            inst_alu: 0,
            inst_branch: 0,
            inst_jump: 0,
            inst_load: 0,
            inst_store: 0,
            flushes: 0,
            stalls_rob_full: 0,
            stalls_rs_full: 0,
            stalls_lsq_full: 0,
            stalls_jalr: 0,
            stalls_fetch: 0,
            alu_ops: 0,
            mem_ops: 0,
        }
    }
}

/// Section names for selective stats output.
///
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "instruction_mix", "stalls", "execution"];

impl SimStats {
    /// Folds one tick's published signals into the counters.
    pub fn observe(&mut self, csu: &CsuOutputs, alu_dispatched: bool, mem_dispatched: bool) {
        self.cycles += 1;
        if let Some(commit) = &csu.commit {
            self.instructions_retired += 1;
            match commit.op {
                op if op.is_load() => self.inst_load += 1,
                op if op.is_store() => self.inst_store += 1,
                op if op.is_branch() => self.inst_branch += 1,
                Opcode::Jal | Opcode::Jalr => self.inst_jump += 1,
                op => {
                    debug_assert_eq!(op.exec_unit(), ExecUnit::Alu);
                    self.inst_alu += 1;
                }
            }
        }
        if csu.flush {
            self.flushes += 1;
        }
        match csu.stall {
            Some(StallCause::RobFull) => self.stalls_rob_full += 1,
            Some(StallCause::RsFull) => self.stalls_rs_full += 1,
            Some(StallCause::LsqFull) => self.stalls_lsq_full += 1,
            Some(StallCause::JalrPending) => self.stalls_jalr += 1,
            Some(StallCause::Undecodable) => self.stalls_fetch += 1,
            Some(StallCause::Halted) | None => {}
        }
        self.alu_ops += u64::from(alu_dispatched);
        self.mem_ops += u64::from(mem_dispatched);
    }

    /// Instructions retired per cycle.
    pub fn ipc(&self) -> f64 {
        self.instructions_retired as f64 / self.cycles.max(1) as f64
    }

    /// Cycles per retired instruction.
    pub fn cpi(&self) -> f64 {
        self.cycles as f64 / self.instructions_retired.max(1) as f64
    }

    /// Total issue stall cycles, excluding the idle tail after a halt issues.
    pub fn total_stalls(&self) -> u64 {
        self.stalls_rob_full
            + self.stalls_rs_full
            + self.stalls_lsq_full
            + self.stalls_jalr
            + self.stalls_fetch
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]. Pass an
    /// empty slice to print all sections (same as `print()`).
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64();
        let cyc = self.cycles.max(1) as f64;
        let instr = self.instructions_retired.max(1) as f64;

        if want("summary") {
            let khz = if seconds > 0.0 {
                (self.cycles as f64 / seconds) / 1000.0
            } else {
                0.0
            };
            println!("\n==========================================================");
            println!("TOMASULO CORE SIMULATION STATISTICS");
            println!("==========================================================");
            println!("host_seconds             {seconds:.4} s");
            println!("sim_cycles               {}", self.cycles);
            println!("sim_freq                 {khz:.2} kHz");
            println!("sim_insts                {}", self.instructions_retired);
            println!("sim_ipc                  {:.4}", self.ipc());
            println!("sim_cpi                  {:.4}", self.cpi());
            println!("sim_flushes              {}", self.flushes);
            println!("----------------------------------------------------------");
        }
        if want("instruction_mix") {
            let line = |name: &str, n: u64| {
                println!("  {name:<22} {n} ({:.2}%)", (n as f64 / instr) * 100.0);
            };
            println!("INSTRUCTION MIX");
            line("op.alu", self.inst_alu);
            line("op.branch", self.inst_branch);
            line("op.jump", self.inst_jump);
            line("op.load", self.inst_load);
            line("op.store", self.inst_store);
            println!("----------------------------------------------------------");
        }
        if want("stalls") {
            let line = |name: &str, n: u64| {
                println!("  {name:<22} {n} ({:.2}%)", (n as f64 / cyc) * 100.0);
            };
            println!("ISSUE STALLS");
            line("stalls.rob_full", self.stalls_rob_full);
            line("stalls.rs_full", self.stalls_rs_full);
            line("stalls.lsq_full", self.stalls_lsq_full);
            line("stalls.jalr", self.stalls_jalr);
            line("stalls.fetch", self.stalls_fetch);
            println!("----------------------------------------------------------");
        }
        if want("execution") {
            println!("EXECUTION");
            println!("  exec.alu_ops           {}", self.alu_ops);
            println!("  exec.mem_ops           {}", self.mem_ops);
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
