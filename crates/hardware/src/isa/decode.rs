//! RV32I Instruction Decoder.
//!
//! This module decodes 32-bit RV32I instruction encodings into the structured
//! [`Decoded`] record. It extracts register indices, resolves the instruction
//! class from the full instruction id, and sign-extends the immediate for every
//! instruction format (R, I, S, B, U, J).
//!
//! Unsupported encodings (RV32M/F/D, system, fence, reserved funct fields) decode
//! to `None`; the scheduler decides whether that is fatal.

use crate::isa::abi::REG_A0;
use crate::isa::instruction::{Decoded, InstructionBits};
use crate::isa::opcode::Opcode;
use crate::isa::rv32i::{funct3, funct7, opcodes};

/// Encoding of the halt sentinel, `addi a0, zero, 255`.
pub const HALT_WORD: u32 = 0x0FF0_0513;

/// Total width of a RISC-V instruction in bits.
const INSTRUCTION_WIDTH: u32 = 32;

/// Bit shift for extracting I-Type immediate field (bits 20-31).
///
/// I-Type format: `imm[11:0] | rs1 | funct3 | rd | opcode`
const I_IMM_SHIFT: u32 = 20;

/// Mask of the shift amount inside a shift-immediate.
const SHAMT_MASK: u32 = 0x1F;

/// Bit shift for extracting S-Type immediate low field (bits 7-11).
///
/// S-Type format: `imm[11:5] | rs2 | rs1 | funct3 | imm[4:0] | opcode`
const S_IMM_LOW_SHIFT: u32 = 7;

/// Bit mask for S-Type immediate low field (5 bits: imm[4:0]).
const S_IMM_LOW_MASK: u32 = 0x1F;

/// Bit shift for extracting S-Type immediate high field (bits 25-31).
const S_IMM_HIGH_SHIFT: u32 = 25;

/// Bit mask for S-Type immediate high field (7 bits: imm[11:5]).
const S_IMM_HIGH_MASK: u32 = 0x7F;

/// Bit shift for combining S-Type immediate fields after extraction.
const S_IMM_COMBINED_SHIFT: u32 = 5;

/// Total number of bits in S-Type immediate (12 bits).
const S_IMM_BITS: u32 = 12;

/// B-Type format: `imm[12] | imm[10:5] | rs2 | rs1 | funct3 | imm[4:1] | imm[11] | opcode`
const B_IMM_11_SHIFT: u32 = 7;
const B_IMM_4_1_SHIFT: u32 = 8;
const B_IMM_4_1_MASK: u32 = 0xF;
const B_IMM_10_5_SHIFT: u32 = 25;
const B_IMM_10_5_MASK: u32 = 0x3F;
const B_IMM_12_SHIFT: u32 = 31;
const B_IMM_BITS: u32 = 13;

/// U-Type format: `imm[31:12] | rd | opcode`; no sign extension needed on RV32.
const U_IMM_MASK: u32 = 0xFFFF_F000;

/// J-Type format: `imm[20] | imm[10:1] | imm[11] | imm[19:12] | rd | opcode`
const J_IMM_19_12_SHIFT: u32 = 12;
const J_IMM_19_12_MASK: u32 = 0xFF;
const J_IMM_11_SHIFT: u32 = 20;
const J_IMM_10_1_SHIFT: u32 = 21;
const J_IMM_10_1_MASK: u32 = 0x3FF;
const J_IMM_20_SHIFT: u32 = 31;
const J_IMM_BITS: u32 = 21;

/// Decodes a RV32I instruction word.
///
/// Returns `None` for encodings outside the supported subset. The halt
/// sentinel decodes to [`Opcode::Halt`] reading a0 as its only operand.
pub fn decode(inst: u32) -> Option<Decoded> {
    if inst == HALT_WORD {
        return Some(Decoded {
            raw: inst,
            op: Opcode::Halt,
            rd: None,
            rs1: Some(REG_A0 as u8),
            rs2: None,
            imm: 0,
        });
    }

    let f3 = inst.funct3();
    let f7 = inst.funct7();
    let alt = match f7 {
        funct7::DEFAULT => 0,
        funct7::ALT => 1,
        _ => 2,
    };

    let op = match inst.opcode() {
        opcodes::OP_LUI => Opcode::Lui,
        opcodes::OP_AUIPC => Opcode::Auipc,
        opcodes::OP_JAL => Opcode::Jal,
        opcodes::OP_JALR if f3 == funct3::JALR => Opcode::Jalr,
        opcodes::OP_BRANCH => match f3 {
            funct3::BEQ => Opcode::Beq,
            funct3::BNE => Opcode::Bne,
            funct3::BLT => Opcode::Blt,
            funct3::BGE => Opcode::Bge,
            funct3::BLTU => Opcode::Bltu,
            funct3::BGEU => Opcode::Bgeu,
            _ => return None,
        },
        opcodes::OP_LOAD => match f3 {
            funct3::LB => Opcode::Lb,
            funct3::LH => Opcode::Lh,
            funct3::LW => Opcode::Lw,
            funct3::LBU => Opcode::Lbu,
            funct3::LHU => Opcode::Lhu,
            _ => return None,
        },
        opcodes::OP_STORE => match f3 {
            funct3::SB => Opcode::Sb,
            funct3::SH => Opcode::Sh,
            funct3::SW => Opcode::Sw,
            _ => return None,
        },
        opcodes::OP_IMM => match (f3, alt) {
            (funct3::ADD_SUB, _) => Opcode::Addi,
            (funct3::SLT, _) => Opcode::Slti,
            (funct3::SLTU, _) => Opcode::Sltiu,
            (funct3::XOR, _) => Opcode::Xori,
            (funct3::OR, _) => Opcode::Ori,
            (funct3::AND, _) => Opcode::Andi,
            (funct3::SLL, 0) => Opcode::Slli,
            (funct3::SRL_SRA, 0) => Opcode::Srli,
            (funct3::SRL_SRA, 1) => Opcode::Srai,
            _ => return None,
        },
        opcodes::OP_REG => match (f3, alt) {
            (funct3::ADD_SUB, 0) => Opcode::Add,
            (funct3::ADD_SUB, 1) => Opcode::Sub,
            (funct3::SLL, 0) => Opcode::Sll,
            (funct3::SLT, 0) => Opcode::Slt,
            (funct3::SLTU, 0) => Opcode::Sltu,
            (funct3::XOR, 0) => Opcode::Xor,
            (funct3::SRL_SRA, 0) => Opcode::Srl,
            (funct3::SRL_SRA, 1) => Opcode::Sra,
            (funct3::OR, 0) => Opcode::Or,
            (funct3::AND, 0) => Opcode::And,
            _ => return None,
        },
        _ => return None,
    };

    let (imm, uses_rd, uses_rs1, uses_rs2) = match inst.opcode() {
        opcodes::OP_LUI | opcodes::OP_AUIPC => (decode_u_type_imm(inst), true, false, false),
        opcodes::OP_JAL => (decode_j_type_imm(inst), true, false, false),
        opcodes::OP_JALR | opcodes::OP_LOAD => (decode_i_type_imm(inst), true, true, false),
        opcodes::OP_IMM => {
            let imm = if matches!(op, Opcode::Slli | Opcode::Srli | Opcode::Srai) {
                (inst >> I_IMM_SHIFT) & SHAMT_MASK
            } else {
                decode_i_type_imm(inst)
            };
            (imm, true, true, false)
        }
        opcodes::OP_BRANCH => (decode_b_type_imm(inst), false, true, true),
        opcodes::OP_STORE => (decode_s_type_imm(inst), false, true, true),
        _ => (0, true, true, true),
    };

    Some(Decoded {
        raw: inst,
        op,
        rd: nonzero(uses_rd, inst.rd()),
        rs1: nonzero(uses_rs1, inst.rs1()),
        rs2: nonzero(uses_rs2, inst.rs2()),
        imm,
    })
}

/// Register field as tracked by the scheduler: x0 and unused fields vanish.
#[inline]
const fn nonzero(used: bool, reg: u8) -> Option<u8> {
    if used && reg != 0 { Some(reg) } else { None }
}

/// Decodes the immediate value for I-Type instructions.
///
/// Used for Load, JALR, and Immediate Arithmetic instructions.
fn decode_i_type_imm(inst: u32) -> u32 {
    ((inst as i32) >> I_IMM_SHIFT) as u32
}

/// Decodes the immediate value for S-Type instructions.
fn decode_s_type_imm(inst: u32) -> u32 {
    let low = (inst >> S_IMM_LOW_SHIFT) & S_IMM_LOW_MASK;
    let high = (inst >> S_IMM_HIGH_SHIFT) & S_IMM_HIGH_MASK;
    let combined = (high << S_IMM_COMBINED_SHIFT) | low;
    sign_extend(combined, S_IMM_BITS)
}

/// Decodes the immediate value for B-Type instructions.
///
/// The immediate represents an even offset.
fn decode_b_type_imm(inst: u32) -> u32 {
    let bit_11 = (inst >> B_IMM_11_SHIFT) & 1;
    let bits_4_1 = (inst >> B_IMM_4_1_SHIFT) & B_IMM_4_1_MASK;
    let bits_10_5 = (inst >> B_IMM_10_5_SHIFT) & B_IMM_10_5_MASK;
    let bit_12 = (inst >> B_IMM_12_SHIFT) & 1;

    let combined = (bit_12 << 12) | (bit_11 << 11) | (bits_10_5 << 5) | (bits_4_1 << 1);
    sign_extend(combined, B_IMM_BITS)
}

/// Decodes the immediate value for U-Type instructions (LUI and AUIPC).
const fn decode_u_type_imm(inst: u32) -> u32 {
    inst & U_IMM_MASK
}

/// Decodes the immediate value for J-Type instructions.
fn decode_j_type_imm(inst: u32) -> u32 {
    let bits_19_12 = (inst >> J_IMM_19_12_SHIFT) & J_IMM_19_12_MASK;
    let bit_11 = (inst >> J_IMM_11_SHIFT) & 1;
    let bits_10_1 = (inst >> J_IMM_10_1_SHIFT) & J_IMM_10_1_MASK;
    let bit_20 = (inst >> J_IMM_20_SHIFT) & 1;

    let combined = (bit_20 << 20) | (bits_19_12 << 12) | (bit_11 << 11) | (bits_10_1 << 1);
    sign_extend(combined, J_IMM_BITS)
}

/// Sign extends a value of `bits` width to 32 bits.
fn sign_extend(val: u32, bits: u32) -> u32 {
    let shift = INSTRUCTION_WIDTH - bits;
    (((val << shift) as i32) >> shift) as u32
}
