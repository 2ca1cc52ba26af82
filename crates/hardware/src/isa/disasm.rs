//! Instruction Disassembler for RV32I.
//!
//! Converts a 32-bit instruction encoding into a human-readable mnemonic
//! string for debug tracing, logging, and test diagnostics.
//!
//! # Usage
//!
//! ```
//! use tomasulo_core::isa::disasm::disassemble;
//! assert_eq!(disassemble(0x00A0_0513), "addi a0, zero, 10");
//! ```

use crate::isa::abi::reg_name;
use crate::isa::decode::decode;
use crate::isa::instruction::InstructionBits;
use crate::isa::opcode::Opcode;

/// Disassembles a 32-bit RV32I instruction into a human-readable string.
///
/// Returns a mnemonic like `"add a0, a1, a2"` or `"unknown"` for
/// unsupported encodings.
pub fn disassemble(inst: u32) -> String {
    let Some(d) = decode(inst) else {
        return "unknown".to_owned();
    };

    // Raw fields, so x0 operands still print.
    let rd = reg_name(inst.rd() as usize);
    let rs1 = reg_name(inst.rs1() as usize);
    let rs2 = reg_name(inst.rs2() as usize);
    let m = d.op.mnemonic();
    let simm = d.imm_signed();

    match d.op {
        Opcode::Halt => m.to_owned(),
        Opcode::Lui | Opcode::Auipc => format!("{m} {rd}, {:#x}", d.imm >> 12),
        Opcode::Jal => format!("{m} {rd}, {simm}"),
        Opcode::Jalr => format!("{m} {rd}, {simm}({rs1})"),
        Opcode::Lb | Opcode::Lh | Opcode::Lw | Opcode::Lbu | Opcode::Lhu => {
            format!("{m} {rd}, {simm}({rs1})")
        }
        Opcode::Sb | Opcode::Sh | Opcode::Sw => format!("{m} {rs2}, {simm}({rs1})"),
        op if op.is_branch() => format!("{m} {rs1}, {rs2}, {simm}"),
        Opcode::Addi
        | Opcode::Slti
        | Opcode::Sltiu
        | Opcode::Xori
        | Opcode::Ori
        | Opcode::Andi
        | Opcode::Slli
        | Opcode::Srli
        | Opcode::Srai => format!("{m} {rd}, {rs1}, {simm}"),
        _ => format!("{m} {rd}, {rs1}, {rs2}"),
    }
}
