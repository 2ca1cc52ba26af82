//! `funct3` values (bits 12-14), grouped by the major opcode they qualify.
//!
//! For loads and stores the low two bits give the access size (byte, half,
//! word) and bit 2 marks a zero-extending load.

/// `lb`: sign-extended byte.
pub const LB: u32 = 0b000;
/// `lh`: sign-extended half.
pub const LH: u32 = 0b001;
/// `lw`.
pub const LW: u32 = 0b010;
/// `lbu`: zero-extended byte.
pub const LBU: u32 = 0b100;
/// `lhu`: zero-extended half.
pub const LHU: u32 = 0b101;

/// `sb`.
pub const SB: u32 = 0b000;
/// `sh`.
pub const SH: u32 = 0b001;
/// `sw`.
pub const SW: u32 = 0b010;

/// `beq`.
pub const BEQ: u32 = 0b000;
/// `bne`.
pub const BNE: u32 = 0b001;
/// `blt`, signed compare.
pub const BLT: u32 = 0b100;
/// `bge`, signed compare.
pub const BGE: u32 = 0b101;
/// `bltu`.
pub const BLTU: u32 = 0b110;
/// `bgeu`.
pub const BGEU: u32 = 0b111;

/// `add`/`sub`/`addi`; `sub` is selected by the funct7 alternate bit.
pub const ADD_SUB: u32 = 0b000;
/// `sll`/`slli`.
pub const SLL: u32 = 0b001;
/// `slt`/`slti`.
pub const SLT: u32 = 0b010;
/// `sltu`/`sltiu`.
pub const SLTU: u32 = 0b011;
/// `xor`/`xori`.
pub const XOR: u32 = 0b100;
/// `srl`/`sra` and their immediate forms; `sra` sets the alternate bit.
pub const SRL_SRA: u32 = 0b101;
/// `or`/`ori`.
pub const OR: u32 = 0b110;
/// `and`/`andi`.
pub const AND: u32 = 0b111;

/// The only valid `funct3` for `jalr`.
pub const JALR: u32 = 0b000;
