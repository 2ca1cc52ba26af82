//! Common utilities and types used throughout the simulator.
//!
//! This module provides fundamental building blocks shared by every unit. It includes:
//! 1. **Clocked Storage:** The write-once-per-tick cell every unit keeps its state in.
//! 2. **Constants:** Structure capacities, memory sizes and halt-signal layout.
//! 3. **Error Handling:** The fatal fault taxonomy.

/// Write-once-per-tick storage cell.
pub mod clocked;

/// Common constants used throughout the simulator.
pub mod constants;

/// Fatal fault definitions.
pub mod error;

pub use clocked::Reg;
pub use error::SimError;
