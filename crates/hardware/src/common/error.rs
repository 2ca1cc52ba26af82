//! Simulator fault definitions.
//!
//! This module defines the fatal error taxonomy of the simulator. It provides:
//! 1. **Protocol Faults:** Scheduler bugs such as double writes within a tick,
//!    requests submitted to a busy memory, or overflowing a unit's capacity.
//! 2. **Host Faults:** Undecodable instructions on the architectural path and
//!    accesses outside the simulated RAM.
//!
//! The guest-visible RV32I subset has no traps, so every variant here aborts the run.
//! Capacity backpressure (ROB/RS/LSQ full, memory busy) is normal flow control and
//! never produces a `SimError`.

use thiserror::Error;

use crate::core::bus::RobTag;

/// Fatal simulator fault.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SimError {
    /// A clocked storage cell was written twice before the tick's sync.
    #[error("double write to `{cell}` within one tick")]
    DoubleWrite {
        /// Type name of the written cell.
        cell: &'static str,
    },

    /// A new memory request arrived while the memory was still busy.
    #[error("memory request for rob #{} submitted while memory is busy", .rob.0)]
    MemoryBusy {
        /// ROB slot of the rejected request.
        rob: RobTag,
    },

    /// The 4-bit request type nibble does not encode a valid access.
    #[error("invalid memory request type {0:#06b}")]
    InvalidRequestType(u8),

    /// An instruction was delivered to a unit with no free slot.
    #[error("{unit} capacity exceeded")]
    CapacityExceeded {
        /// Name of the overflowing unit.
        unit: &'static str,
    },

    /// The word at the architectural PC is not a supported RV32I instruction.
    #[error("illegal instruction {word:#010x} at pc {pc:#010x}")]
    IllegalInstruction {
        /// Program counter of the instruction.
        pc: u32,
        /// Raw instruction word (0 when the fetch itself was out of range).
        word: u32,
    },

    /// A data access touched bytes beyond the end of RAM.
    #[error("access of {width} byte(s) at {addr:#010x} is outside memory")]
    AddressOutOfRange {
        /// First byte address of the access.
        addr: u32,
        /// Access width in bytes.
        width: u32,
    },

    /// An internal consistency check failed.
    #[error("internal inconsistency: {0}")]
    Inconsistent(String),
}
