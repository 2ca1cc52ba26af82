//! Decoded instruction classes.
//!
//! Every supported instruction is one variant of [`Opcode`]. The variant is
//! computed once at decode time and then travels through the issue, dispatch and
//! commit packets; units match on it exhaustively instead of re-inspecting bits.
//!
//! The composite "full instruction id" packs `opcode | funct3 << 7 | funct7[5] << 10`
//! into one key. `funct3` is zeroed for the formats that lack it (LUI, AUIPC, JAL)
//! and the funct7 bit is only meaningful for OP and the shift-immediates.

use crate::isa::rv32i::{funct3 as f3, opcodes as op};

/// Shift of the funct3 field inside the full id.
const FUNCT3_SHIFT: u32 = 7;

/// Shift of the funct7 alternate bit inside the full id.
const FUNCT7_BIT_SHIFT: u32 = 10;

/// Full id reserved for the halt sentinel; lies outside every real encoding.
pub const HALT_FULL_ID: u32 = 1 << 11;

/// Builds a full instruction id.
const fn id(opcode: u32, funct3: u32, alt: u32) -> u32 {
    opcode | (funct3 << FUNCT3_SHIFT) | (alt << FUNCT7_BIT_SHIFT)
}

/// Which execution path an instruction takes after issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExecUnit {
    /// Reservation station and ALU (arithmetic, branches, jumps, halt).
    Alu,
    /// Load/store queue and memory.
    Memory,
}

/// Closed set of RV32I instructions plus the halt pseudo-instruction.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    Lui,
    Auipc,
    Jal,
    Jalr,
    Beq,
    Bne,
    Blt,
    Bge,
    Bltu,
    Bgeu,
    Lb,
    Lh,
    Lw,
    Lbu,
    Lhu,
    Sb,
    Sh,
    Sw,
    Addi,
    Slti,
    Sltiu,
    Xori,
    Ori,
    Andi,
    Slli,
    Srli,
    Srai,
    Add,
    Sub,
    Sll,
    Slt,
    Sltu,
    Xor,
    Srl,
    Sra,
    Or,
    And,
    /// Program-termination sentinel; its result is the exit code.
    Halt,
}

/// Lookup table between opcodes and full ids.
const TABLE: [(Opcode, u32); 38] = [
    (Opcode::Lui, id(op::OP_LUI, 0, 0)),
    (Opcode::Auipc, id(op::OP_AUIPC, 0, 0)),
    (Opcode::Jal, id(op::OP_JAL, 0, 0)),
    (Opcode::Jalr, id(op::OP_JALR, f3::JALR, 0)),
    (Opcode::Beq, id(op::OP_BRANCH, f3::BEQ, 0)),
    (Opcode::Bne, id(op::OP_BRANCH, f3::BNE, 0)),
    (Opcode::Blt, id(op::OP_BRANCH, f3::BLT, 0)),
    (Opcode::Bge, id(op::OP_BRANCH, f3::BGE, 0)),
    (Opcode::Bltu, id(op::OP_BRANCH, f3::BLTU, 0)),
    (Opcode::Bgeu, id(op::OP_BRANCH, f3::BGEU, 0)),
    (Opcode::Lb, id(op::OP_LOAD, f3::LB, 0)),
    (Opcode::Lh, id(op::OP_LOAD, f3::LH, 0)),
    (Opcode::Lw, id(op::OP_LOAD, f3::LW, 0)),
    (Opcode::Lbu, id(op::OP_LOAD, f3::LBU, 0)),
    (Opcode::Lhu, id(op::OP_LOAD, f3::LHU, 0)),
    (Opcode::Sb, id(op::OP_STORE, f3::SB, 0)),
    (Opcode::Sh, id(op::OP_STORE, f3::SH, 0)),
    (Opcode::Sw, id(op::OP_STORE, f3::SW, 0)),
    (Opcode::Addi, id(op::OP_IMM, f3::ADD_SUB, 0)),
    (Opcode::Slti, id(op::OP_IMM, f3::SLT, 0)),
    (Opcode::Sltiu, id(op::OP_IMM, f3::SLTU, 0)),
    (Opcode::Xori, id(op::OP_IMM, f3::XOR, 0)),
    (Opcode::Ori, id(op::OP_IMM, f3::OR, 0)),
    (Opcode::Andi, id(op::OP_IMM, f3::AND, 0)),
    (Opcode::Slli, id(op::OP_IMM, f3::SLL, 0)),
    (Opcode::Srli, id(op::OP_IMM, f3::SRL_SRA, 0)),
    (Opcode::Srai, id(op::OP_IMM, f3::SRL_SRA, 1)),
    (Opcode::Add, id(op::OP_REG, f3::ADD_SUB, 0)),
    (Opcode::Sub, id(op::OP_REG, f3::ADD_SUB, 1)),
    (Opcode::Sll, id(op::OP_REG, f3::SLL, 0)),
    (Opcode::Slt, id(op::OP_REG, f3::SLT, 0)),
    (Opcode::Sltu, id(op::OP_REG, f3::SLTU, 0)),
    (Opcode::Xor, id(op::OP_REG, f3::XOR, 0)),
    (Opcode::Srl, id(op::OP_REG, f3::SRL_SRA, 0)),
    (Opcode::Sra, id(op::OP_REG, f3::SRL_SRA, 1)),
    (Opcode::Or, id(op::OP_REG, f3::OR, 0)),
    (Opcode::And, id(op::OP_REG, f3::AND, 0)),
    (Opcode::Halt, HALT_FULL_ID),
];

impl Opcode {
    /// Every opcode, in table order.
    pub fn all() -> impl Iterator<Item = Self> {
        TABLE.iter().map(|&(o, _)| o)
    }

    /// Returns the composite dispatch key of this instruction class.
    pub fn full_id(self) -> u32 {
        TABLE
            .iter()
            .find(|(o, _)| *o == self)
            .map_or(HALT_FULL_ID, |&(_, id)| id)
    }

    /// Inverse of [`Opcode::full_id`].
    pub fn from_full_id(full_id: u32) -> Option<Self> {
        TABLE.iter().find(|(_, id)| *id == full_id).map(|&(o, _)| o)
    }

    /// Execution path of this instruction.
    pub const fn exec_unit(self) -> ExecUnit {
        if self.is_load() || self.is_store() {
            ExecUnit::Memory
        } else {
            ExecUnit::Alu
        }
    }

    /// Conditional branch.
    pub const fn is_branch(self) -> bool {
        matches!(
            self,
            Self::Beq | Self::Bne | Self::Blt | Self::Bge | Self::Bltu | Self::Bgeu
        )
    }

    /// JAL or JALR.
    pub const fn is_jump(self) -> bool {
        matches!(self, Self::Jal | Self::Jalr)
    }

    /// One of the five loads.
    pub const fn is_load(self) -> bool {
        matches!(self, Self::Lb | Self::Lh | Self::Lw | Self::Lbu | Self::Lhu)
    }

    /// One of the three stores.
    pub const fn is_store(self) -> bool {
        matches!(self, Self::Sb | Self::Sh | Self::Sw)
    }

    /// Access width in bytes for loads and stores, 0 otherwise.
    pub const fn access_width(self) -> u32 {
        match self {
            Self::Lb | Self::Lbu | Self::Sb => 1,
            Self::Lh | Self::Lhu | Self::Sh => 2,
            Self::Lw | Self::Sw => 4,
            _ => 0,
        }
    }

    /// Whether a narrow load result is sign-extended (LB/LH only).
    pub const fn sign_extends(self) -> bool {
        matches!(self, Self::Lb | Self::Lh)
    }

    /// Lower-case assembler mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Lui => "lui",
            Self::Auipc => "auipc",
            Self::Jal => "jal",
            Self::Jalr => "jalr",
            Self::Beq => "beq",
            Self::Bne => "bne",
            Self::Blt => "blt",
            Self::Bge => "bge",
            Self::Bltu => "bltu",
            Self::Bgeu => "bgeu",
            Self::Lb => "lb",
            Self::Lh => "lh",
            Self::Lw => "lw",
            Self::Lbu => "lbu",
            Self::Lhu => "lhu",
            Self::Sb => "sb",
            Self::Sh => "sh",
            Self::Sw => "sw",
            Self::Addi => "addi",
            Self::Slti => "slti",
            Self::Sltiu => "sltiu",
            Self::Xori => "xori",
            Self::Ori => "ori",
            Self::Andi => "andi",
            Self::Slli => "slli",
            Self::Srli => "srli",
            Self::Srai => "srai",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Sll => "sll",
            Self::Slt => "slt",
            Self::Sltu => "sltu",
            Self::Xor => "xor",
            Self::Srl => "srl",
            Self::Sra => "sra",
            Self::Or => "or",
            Self::And => "and",
            Self::Halt => "halt",
        }
    }
}
