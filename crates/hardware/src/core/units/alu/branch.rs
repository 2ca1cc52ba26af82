//! Control-flow resolution.
//!
//! Resolves conditional branches and jumps to their architectural next PC.
//! Jumps also produce the link address `pc + 4` as their register result.

use crate::common::constants::INSTRUCTION_SIZE;
use crate::isa::Opcode;

/// Evaluates a conditional branch condition.
///
/// Returns `false` for opcodes that are not branches.
pub const fn taken(op: Opcode, a: u32, b: u32) -> bool {
    match op {
        Opcode::Beq => a == b,
        Opcode::Bne => a != b,
        Opcode::Blt => (a as i32) < (b as i32),
        Opcode::Bge => (a as i32) >= (b as i32),
        Opcode::Bltu => a < b,
        Opcode::Bgeu => a >= b,
        _ => false,
    }
}

/// Resolves a control-flow instruction.
///
/// Returns `(result, next_pc)`: the link address for JAL/JALR, 0 for branches.
/// The JALR target has bit 0 cleared.
pub const fn resolve(op: Opcode, a: u32, b: u32, imm: u32, pc: u32) -> (u32, u32) {
    let fallthrough = pc.wrapping_add(INSTRUCTION_SIZE);
    match op {
        Opcode::Jal => (fallthrough, pc.wrapping_add(imm)),
        Opcode::Jalr => (fallthrough, a.wrapping_add(imm) & !1),
        _ => {
            if taken(op, a, b) {
                (0, pc.wrapping_add(imm))
            } else {
                (0, fallthrough)
            }
        }
    }
}
