//! Global System Constants.
//!
//! This module defines system-wide constants used across the simulator. It includes:
//! 1. **Structure Sizes:** Capacities of the reorder buffer, reservation station and LSQ.
//! 2. **Memory Constants:** Default RAM size and instruction size.
//! 3. **Simulation Constants:** Halt signal layout and the cycle-cap exit code.

/// Number of reorder buffer entries.
pub const ROB_SIZE: usize = 32;

/// Number of reservation station slots.
pub const RS_SIZE: usize = 32;

/// Number of load/store queue slots.
pub const LSQ_SIZE: usize = 32;

/// Number of architectural integer registers.
pub const NUM_REGS: usize = 32;

/// Default RAM size in bytes (1 MiB).
pub const DEFAULT_MEMORY_SIZE: usize = 1 << 20;

/// Size of a standard (32-bit) RISC-V instruction in bytes.
pub const INSTRUCTION_SIZE: u32 = 4;

/// Marker bit of the packed halt signal; the low 8 bits carry the exit code.
pub const HALT_MARKER: u16 = 1 << 8;

/// Exit code returned when the cycle cap is reached before the program halts.
pub const CYCLE_CAP_EXIT_CODE: u8 = 255;

/// Most bytes a single store changes.
pub const MAX_ACCESS_BYTES: usize = 4;
