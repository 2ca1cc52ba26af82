//! RISC-V Application Binary Interface (ABI) register names.
//!
//! Defines the register indices the simulator refers to by role, plus the
//! full ABI name table used by the disassembler.

/// Register x0 (zero register, always zero).
pub const REG_ZERO: usize = 0;
/// Register x1 (return address, ra).
pub const REG_RA: usize = 1;
/// Register x2 (stack pointer, sp).
pub const REG_SP: usize = 2;
/// Register x10 (first argument/return value, a0). Carries the exit code at halt.
pub const REG_A0: usize = 10;
/// Register x11 (second argument, a1).
pub const REG_A1: usize = 11;

/// ABI names indexed by register number.
pub const REG_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// Returns the ABI name of register `idx` (masked to 5 bits).
#[inline]
pub const fn reg_name(idx: usize) -> &'static str {
    REG_NAMES[idx & 0x1F]
}
