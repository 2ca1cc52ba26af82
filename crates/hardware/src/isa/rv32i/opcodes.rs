//! Major opcodes (bits 0-6). All RV32I opcodes end in `0b11`; the compressed
//! quadrants are not supported.

/// `lb`, `lh`, `lw`, `lbu`, `lhu`.
pub const OP_LOAD: u32 = 0b000_0011;
/// Register-immediate ALU operations and shift-immediates.
pub const OP_IMM: u32 = 0b001_0011;
/// `auipc`.
pub const OP_AUIPC: u32 = 0b001_0111;
/// `sb`, `sh`, `sw`.
pub const OP_STORE: u32 = 0b010_0011;
/// Register-register ALU operations.
pub const OP_REG: u32 = 0b011_0011;
/// `lui`.
pub const OP_LUI: u32 = 0b011_0111;
/// Conditional branches.
pub const OP_BRANCH: u32 = 0b110_0011;
/// `jalr`.
pub const OP_JALR: u32 = 0b110_0111;
/// `jal`.
pub const OP_JAL: u32 = 0b110_1111;
