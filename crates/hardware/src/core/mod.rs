//! Core processor implementation.
//!
//! This module contains the out-of-order core: the signals units exchange, the
//! clocked unit interface, the central schedule unit with its reorder buffer,
//! the execution units, and the `Cpu` that ticks them together.

/// Inter-unit signals and the per-tick snapshot.
pub mod bus;

/// CPU container and the two-phase tick driver.
pub mod cpu;

/// Central schedule unit (fetch, issue, ROB, commit, flush).
pub mod csu;

/// Clocked unit trait.
pub mod traits;

/// Execution units (register file, RS, LSQ, ALU, memory).
pub mod units;

pub use self::cpu::Cpu;
