//! Execution units and the storage they own.
//!
//! This module contains the five units the central schedule unit talks to:
//! the register file, the reservation station, the load/store queue, the ALU
//! and the data memory. Each one implements [`Unit`](crate::core::traits::Unit)
//! and communicates only through the [`Bus`](crate::core::bus::Bus) snapshot.

/// Arithmetic Logic Unit for integer and control-flow operations.
pub mod alu;

/// Load/Store Queue holding memory operations in program order.
pub mod lsq;

/// Data memory with the busy protocol and speculative-write rollback.
pub mod memory;

/// Operand slots shared by the reservation station and the load/store queue.
pub mod operand;

/// Architectural register file with producer tracking.
pub mod register_file;

/// Reservation Station holding ALU operations until their operands arrive.
pub mod reservation_station;
