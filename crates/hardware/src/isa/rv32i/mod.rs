//! RV32I encoding constants.
//!
//! Only the fields the decoder matches on live here; immediates are assembled
//! in [`decode`](crate::isa::decode).

/// Minor opcodes.
pub mod funct3;

/// OP / shift-immediate form selector.
pub mod funct7;

/// Major opcodes.
pub mod opcodes;
