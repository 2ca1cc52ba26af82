//! Arithmetic Logic Unit (ALU).
//!
//! This module implements the single-cycle integer ALU. Each tick it takes the
//! request the reservation station dispatched in the previous tick and
//! broadcasts `{rob, value, next_pc}`. It keeps no state beyond that output latch.
//!
//! Operations are organized into submodules by category:
//! - [`arithmetic`]: Add, Sub, Addi, Lui, Auipc, effective addresses
//! - [`logic`]:      Or, And, Xor, Slt, Sltu and their immediate forms
//! - [`shifts`]:     Sll, Srl, Sra and their immediate forms
//! - [`branch`]:     Conditional branches, Jal, Jalr

/// Integer arithmetic operations (add, subtract, upper immediates).
pub mod arithmetic;

/// Conditional branch and jump resolution.
pub mod branch;

/// Bitwise logical and comparison operations (or, and, xor, slt).
pub mod logic;

/// Shift operations (sll, srl, sra).
pub mod shifts;

use tracing::trace;

use crate::common::clocked::Reg;
use crate::common::constants::INSTRUCTION_SIZE;
use crate::common::error::SimError;
use crate::core::bus::{AluOutputs, AluRequest, Bus, Completion};
use crate::core::traits::Unit;
use crate::isa::Opcode;

/// Arithmetic Logic Unit (ALU) for integer operations.
#[derive(Debug)]
pub struct Alu {
    out: Reg<AluOutputs>,
}

impl Default for Alu {
    fn default() -> Self {
        Self::new()
    }
}

impl Alu {
    /// Creates an idle ALU.
    pub fn new() -> Self {
        Self {
            out: Reg::new(AluOutputs::default()),
        }
    }

    /// Outputs published at the last sync.
    pub fn outputs(&self) -> AluOutputs {
        self.out.get()
    }

    /// Executes one instruction.
    ///
    /// Dispatches to the appropriate submodule based on the instruction class.
    ///
    /// # Arguments
    ///
    /// * `op`  - The instruction class
    /// * `a`   - First operand (rs1 value)
    /// * `b`   - Second operand (rs2 value)
    /// * `imm` - Sign-extended immediate or shift amount
    /// * `pc`  - Program counter of the instruction
    ///
    /// # Returns
    ///
    /// `(value, next_pc)`. Loads and stores yield their effective address.
    /// Halt passes `a` (the value of a0) through as its result.
    ///
    /// # Examples
    ///
    /// ```
    /// use tomasulo_core::core::units::alu::Alu;
    /// use tomasulo_core::isa::Opcode;
    ///
    /// assert_eq!(Alu::execute(Opcode::Sub, 5, 3, 0, 0x100), (2, 0x104));
    ///
    /// // blt -1, 1 is taken
    /// let (_, next) = Alu::execute(Opcode::Blt, 0xFFFF_FFFF, 1, 16, 0x100);
    /// assert_eq!(next, 0x110);
    ///
    /// // jalr clears bit 0 of the target
    /// assert_eq!(Alu::execute(Opcode::Jalr, 0x201, 0, 0, 0x100), (0x104, 0x200));
    /// ```
    pub const fn execute(op: Opcode, a: u32, b: u32, imm: u32, pc: u32) -> (u32, u32) {
        let next = pc.wrapping_add(INSTRUCTION_SIZE);
        match op {
            Opcode::Add | Opcode::Sub | Opcode::Addi | Opcode::Lui | Opcode::Auipc => {
                (arithmetic::execute(op, a, b, imm, pc), next)
            }

            Opcode::Or
            | Opcode::And
            | Opcode::Xor
            | Opcode::Ori
            | Opcode::Andi
            | Opcode::Xori
            | Opcode::Slt
            | Opcode::Sltu
            | Opcode::Slti
            | Opcode::Sltiu => (logic::execute(op, a, b, imm), next),

            Opcode::Sll
            | Opcode::Slli
            | Opcode::Srl
            | Opcode::Srli
            | Opcode::Sra
            | Opcode::Srai => (shifts::execute(op, a, b, imm), next),

            Opcode::Jal
            | Opcode::Jalr
            | Opcode::Beq
            | Opcode::Bne
            | Opcode::Blt
            | Opcode::Bge
            | Opcode::Bltu
            | Opcode::Bgeu => branch::resolve(op, a, b, imm, pc),

            Opcode::Lb
            | Opcode::Lh
            | Opcode::Lw
            | Opcode::Lbu
            | Opcode::Lhu
            | Opcode::Sb
            | Opcode::Sh
            | Opcode::Sw => (arithmetic::effective_address(a, imm), next),

            Opcode::Halt => (a, next),
        }
    }

    /// Executes a dispatched request into its completion broadcast.
    pub const fn complete(req: &AluRequest) -> Completion {
        let (value, next_pc) = Self::execute(req.op, req.operand1, req.operand2, req.imm, req.pc);
        Completion {
            rob: req.rob,
            value,
            next_pc,
        }
    }
}

impl Unit for Alu {
    fn name(&self) -> &'static str {
        "alu"
    }

    fn work(&mut self, bus: &Bus<'_>) -> Result<(), SimError> {
        // A request dispatched before the flush belongs to the squashed path.
        let completion = if bus.csu.flush {
            None
        } else {
            bus.rs.request.as_ref().map(Self::complete)
        };
        if let Some(c) = completion {
            trace!(rob = c.rob.0, value = c.value, next_pc = c.next_pc, "alu result");
        }
        self.out.set(AluOutputs { completion })
    }

    fn sync(&mut self) {
        self.out.sync();
    }
}
