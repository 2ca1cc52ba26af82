//! Instruction Set Architecture (ISA) Definitions.
//!
//! Contains definitions for opcodes, function codes, and decoding logic for the
//! RV32I base integer instruction set plus the halt sentinel.

/// Application Binary Interface (ABI) register name mappings.
pub mod abi;

/// Instruction decoding logic for all RV32I instruction formats.
pub mod decode;

/// Instruction disassembler for debug tracing and diagnostics.
pub mod disasm;

/// Instruction encoding structures and bit extraction utilities.
pub mod instruction;

/// Decoded instruction classes and the full instruction id.
pub mod opcode;

/// Base integer instruction set (32-bit RISC-V core instructions).
pub mod rv32i;

pub use decode::{HALT_WORD, decode};
pub use instruction::Decoded;
pub use opcode::{ExecUnit, Opcode};
