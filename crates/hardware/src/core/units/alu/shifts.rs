//! ALU shift operations.
//!
//! Implements shift-left logical (SLL), shift-right logical (SRL), and
//! shift-right arithmetic (SRA) with their immediate forms. Shift amounts are
//! masked to 5 bits (0-31).
//!
//! SRA is computed as a logical shift followed by filling the vacated high
//! bits with copies of the original sign bit, so the result never depends on
//! how a host treats signed right shifts.

use crate::isa::Opcode;

/// Bit mask for the shift amount (5 bits: 0-31).
const SHAMT_MASK: u32 = 0x1f;

/// Sign bit of a 32-bit word.
const SIGN_BIT: u32 = 1 << 31;

/// Executes a shift operation.
///
/// Register forms take the amount from `b`, immediate forms from `imm`.
/// Returns `0` for non-shift opcodes.
pub const fn execute(op: Opcode, a: u32, b: u32, imm: u32) -> u32 {
    match op {
        Opcode::Sll => a << (b & SHAMT_MASK),
        Opcode::Slli => a << (imm & SHAMT_MASK),
        Opcode::Srl => a >> (b & SHAMT_MASK),
        Opcode::Srli => a >> (imm & SHAMT_MASK),
        Opcode::Sra => shift_right_arithmetic(a, b & SHAMT_MASK),
        Opcode::Srai => shift_right_arithmetic(a, imm & SHAMT_MASK),
        _ => 0,
    }
}

/// Shifts right by `n` (< 32) and replicates the sign bit into the `n`
/// highest result bits.
pub const fn shift_right_arithmetic(a: u32, n: u32) -> u32 {
    let logical = a >> n;
    if a & SIGN_BIT == 0 {
        logical
    } else {
        logical | !(u32::MAX >> n)
    }
}
