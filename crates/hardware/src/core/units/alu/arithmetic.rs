//! ALU arithmetic operations.
//!
//! Implements addition and subtraction for the register and immediate forms,
//! the upper-immediate instructions, and effective-address calculation for
//! loads and stores. All arithmetic wraps modulo 2^32.

use crate::isa::Opcode;

/// Executes an arithmetic operation.
///
/// # Arguments
///
/// * `op`  - The instruction class (must be an arithmetic variant).
/// * `a`   - First operand (rs1 value).
/// * `b`   - Second operand (rs2 value).
/// * `imm` - Sign-extended immediate.
/// * `pc`  - Program counter of the instruction (for AUIPC).
///
/// # Returns
///
/// The 32-bit result. Returns `0` for non-arithmetic opcodes.
pub const fn execute(op: Opcode, a: u32, b: u32, imm: u32, pc: u32) -> u32 {
    match op {
        Opcode::Add => a.wrapping_add(b),
        Opcode::Sub => a.wrapping_sub(b),
        Opcode::Addi => a.wrapping_add(imm),
        Opcode::Lui => imm,
        Opcode::Auipc => pc.wrapping_add(imm),
        _ => 0,
    }
}

/// Effective address of a load or store: `rs1 + imm`.
#[inline]
pub const fn effective_address(base: u32, imm: u32) -> u32 {
    base.wrapping_add(imm)
}
