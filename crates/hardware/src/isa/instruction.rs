//! Instruction fields.
//!
//! [`InstructionBits`] slices the fixed-position fields out of a raw word;
//! [`Decoded`] is what the decoder hands to the scheduler, the execution units
//! and the reference interpreter.

use crate::isa::opcode::Opcode;

/// `(shift, width)` of every fixed-position field.
mod field {
    pub const OPCODE: (u32, u32) = (0, 7);
    pub const RD: (u32, u32) = (7, 5);
    pub const FUNCT3: (u32, u32) = (12, 3);
    pub const RS1: (u32, u32) = (15, 5);
    pub const RS2: (u32, u32) = (20, 5);
    pub const FUNCT7: (u32, u32) = (25, 7);
}

#[inline(always)]
const fn bits(word: u32, (shift, width): (u32, u32)) -> u32 {
    (word >> shift) & ((1 << width) - 1)
}

/// Raw field access on an encoded instruction.
pub trait InstructionBits {
    /// Major opcode, bits 0-6.
    fn opcode(&self) -> u32;
    /// Destination register index, bits 7-11.
    fn rd(&self) -> u8;
    /// First source register index, bits 15-19.
    fn rs1(&self) -> u8;
    /// Second source register index, bits 20-24.
    fn rs2(&self) -> u8;
    /// Minor opcode, bits 12-14.
    fn funct3(&self) -> u32;
    /// Bits 25-31; bit 5 of it selects SUB/SRA.
    fn funct7(&self) -> u32;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn opcode(&self) -> u32 {
        bits(*self, field::OPCODE)
    }

    #[inline(always)]
    fn rd(&self) -> u8 {
        bits(*self, field::RD) as u8
    }

    #[inline(always)]
    fn rs1(&self) -> u8 {
        bits(*self, field::RS1) as u8
    }

    #[inline(always)]
    fn rs2(&self) -> u8 {
        bits(*self, field::RS2) as u8
    }

    #[inline(always)]
    fn funct3(&self) -> u32 {
        bits(*self, field::FUNCT3)
    }

    #[inline(always)]
    fn funct7(&self) -> u32 {
        bits(*self, field::FUNCT7)
    }
}

/// Decoded instruction record.
///
/// Register fields are `None` when the instruction does not use them or when
/// they name x0: such operands read as the literal 0 and need no tracking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decoded {
    /// Raw 32-bit instruction encoding.
    pub raw: u32,
    /// Instruction class (the dispatch key).
    pub op: Opcode,
    /// Destination register, if the instruction writes a non-zero register.
    pub rd: Option<u8>,
    /// First source register.
    pub rs1: Option<u8>,
    /// Second source register.
    pub rs2: Option<u8>,
    /// Sign-extended immediate (shift amount for shift-immediates).
    pub imm: u32,
}

impl Decoded {
    /// The immediate reinterpreted as a signed value.
    #[inline]
    pub const fn imm_signed(&self) -> i32 {
        self.imm as i32
    }
}
