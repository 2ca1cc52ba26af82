//! ALU logical and comparison operations.
//!
//! Implements bitwise OR, AND, XOR, and set-less-than (signed and unsigned)
//! in both the register and immediate forms. Comparison results are 0 or 1.

use crate::isa::Opcode;

/// Executes a logical or comparison operation.
///
/// The immediate forms use `imm` as the second operand. Returns `0` for
/// non-logic opcodes.
pub const fn execute(op: Opcode, a: u32, b: u32, imm: u32) -> u32 {
    match op {
        Opcode::Or => a | b,
        Opcode::And => a & b,
        Opcode::Xor => a ^ b,
        Opcode::Ori => a | imm,
        Opcode::Andi => a & imm,
        Opcode::Xori => a ^ imm,
        Opcode::Slt => ((a as i32) < (b as i32)) as u32,
        Opcode::Sltu => (a < b) as u32,
        Opcode::Slti => ((a as i32) < (imm as i32)) as u32,
        Opcode::Sltiu => (a < imm) as u32,
        _ => 0,
    }
}
