//! Simulation driver, program loading and the reference interpreter.
//!
//! Provides the cycle loop around [`Cpu`](crate::core::Cpu), the program image
//! reader, and a sequential interpreter used as an oracle.

/// Program image parsing and placement.
pub mod loader;

/// Sequential RV32I reference interpreter.
pub mod reference;

/// Evaluation-order shuffling.
pub mod shuffle;

/// Cycle loop and run policy.
pub mod simulator;

pub use loader::{LoadError, ProgramImage};
pub use reference::Interpreter;
pub use simulator::Simulator;
