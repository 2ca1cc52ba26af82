//! `funct7` values (bits 25-31) for OP and the shift-immediates.

/// Base form: `add`, `srl`, `srli`, and every other OP instruction.
pub const DEFAULT: u32 = 0b000_0000;

/// Alternate form: `sub`, `sra`, `srai`.
pub const ALT: u32 = 0b010_0000;

/// The bit of `funct7` (word bit 30) that separates the two forms.
pub const ALT_BIT: u32 = 1 << 5;
