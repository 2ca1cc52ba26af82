//! Cycle-accurate Tomasulo RV32I core simulator library.
//!
//! This crate implements an out-of-order RISC-V RV32I core with the following:
//! 1. **Core:** Central schedule unit with a 32-entry reorder buffer, reservation
//!    station, load/store queue, register file, ALU and a single-ported memory
//!    with speculative-write rollback.
//! 2. **Clocking:** Two-phase evaluate/sync ticks over a published-signal snapshot,
//!    with write-once-per-tick state cells.
//! 3. **ISA:** Decoding and disassembly for RV32I plus the halt sentinel.
//! 4. **Simulation:** Image loader, cycle driver, reference interpreter,
//!    configuration, and statistics collection.

/// Common types and constants (clocked cells, capacities, errors).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// Processor core (bus, CSU, units, tick driver).
pub mod core;
/// Instruction set (decode, opcode classes, ABI names, disassembly).
pub mod isa;
/// Program loading, cycle driver and reference interpreter.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Fatal protocol fault raised by any unit.
pub use crate::common::error::SimError;
/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Processor state: the six clocked units and RAM.
pub use crate::core::Cpu;
/// Top-level simulator; construct with `Simulator::new`.
pub use crate::sim::Simulator;
