//! Reference Interpreter.
//!
//! A one-instruction-at-a-time RV32I executor over the same [`Ram`] model and
//! the same halt rule as the out-of-order core. It shares only the decoder with
//! the core, so it serves as an independent oracle in differential tests and in
//! `sim --reference`.

use tracing::{debug, trace};

use crate::common::constants::{CYCLE_CAP_EXIT_CODE, INSTRUCTION_SIZE, NUM_REGS};
use crate::common::error::SimError;
use crate::core::units::memory::ram::Ram;
use crate::isa::abi::REG_A0;
use crate::isa::{Decoded, Opcode, decode};

/// Sequential RV32I interpreter.
#[derive(Debug)]
pub struct Interpreter {
    regs: [u32; NUM_REGS],
    pc: u32,
    ram: Ram,
    retired: u64,
}

impl Interpreter {
    /// Creates an interpreter that starts at `start_pc` over `ram`.
    pub fn new(ram: Ram, start_pc: u32) -> Self {
        Self {
            regs: [0; NUM_REGS],
            pc: start_pc,
            ram,
            retired: 0,
        }
    }

    /// Value of register `idx`.
    pub fn register(&self, idx: usize) -> u32 {
        self.regs[idx]
    }

    /// Current program counter.
    pub const fn pc(&self) -> u32 {
        self.pc
    }

    /// Instructions executed so far (including the halt).
    pub const fn retired(&self) -> u64 {
        self.retired
    }

    /// Memory contents.
    pub const fn ram(&self) -> &Ram {
        &self.ram
    }

    fn write(&mut self, rd: Option<u8>, value: u32) {
        if let Some(rd) = rd {
            self.regs[rd as usize] = value;
        }
    }

    fn src(&self, reg: Option<u8>) -> u32 {
        reg.map_or(0, |r| self.regs[r as usize])
    }

    /// Executes one instruction.
    ///
    /// Returns the exit code if the instruction was the halt sentinel.
    ///
    /// # Errors
    ///
    /// [`SimError::IllegalInstruction`] for an undecodable word and
    /// [`SimError::AddressOutOfRange`] for a fetch or access past the end of RAM.
    pub fn step(&mut self) -> Result<Option<u8>, SimError> {
        let pc = self.pc;
        let word = self.ram.fetch(pc).ok_or(SimError::AddressOutOfRange {
            addr: pc,
            width: INSTRUCTION_SIZE,
        })?;
        let inst = decode(word).ok_or(SimError::IllegalInstruction { pc, word })?;
        trace!(pc, op = inst.op.mnemonic(), "reference step");
        self.retired += 1;

        if inst.op == Opcode::Halt {
            let code = (self.regs[REG_A0] & 0xFF) as u8;
            debug!(code, retired = self.retired, "reference halt");
            return Ok(Some(code));
        }

        self.pc = self.execute(&inst)?;
        Ok(None)
    }

    /// Executes `inst` and returns the next PC.
    fn execute(&mut self, inst: &Decoded) -> Result<u32, SimError> {
        let pc = self.pc;
        let next = pc.wrapping_add(INSTRUCTION_SIZE);
        let a = self.src(inst.rs1);
        let b = self.src(inst.rs2);
        let imm = inst.imm;
        let simm = inst.imm_signed();

        let value = match inst.op {
            Opcode::Lui => imm,
            Opcode::Auipc => pc.wrapping_add(imm),
            Opcode::Jal => {
                self.write(inst.rd, next);
                return Ok(pc.wrapping_add(imm));
            }
            Opcode::Jalr => {
                self.write(inst.rd, next);
                return Ok(a.wrapping_add(imm) & !1);
            }
            Opcode::Beq | Opcode::Bne | Opcode::Blt | Opcode::Bge | Opcode::Bltu | Opcode::Bgeu => {
                let taken = match inst.op {
                    Opcode::Beq => a == b,
                    Opcode::Bne => a != b,
                    Opcode::Blt => (a as i32) < (b as i32),
                    Opcode::Bge => (a as i32) >= (b as i32),
                    Opcode::Bltu => a < b,
                    _ => a >= b,
                };
                return Ok(if taken { pc.wrapping_add(imm) } else { next });
            }
            Opcode::Lb | Opcode::Lh | Opcode::Lw | Opcode::Lbu | Opcode::Lhu => {
                let addr = a.wrapping_add(imm);
                let raw = self.ram.read(addr, inst.op.access_width())?;
                match inst.op {
                    Opcode::Lb => i32::from(raw as u8 as i8) as u32,
                    Opcode::Lh => i32::from(raw as u16 as i16) as u32,
                    _ => raw,
                }
            }
            Opcode::Sb | Opcode::Sh | Opcode::Sw => {
                let addr = a.wrapping_add(imm);
                let width = inst.op.access_width();
                self.ram.check_range(addr, width)?;
                for i in 0..width {
                    self.ram.write_byte(addr + i, (b >> (8 * i)) as u8)?;
                }
                return Ok(next);
            }
            Opcode::Addi => a.wrapping_add(imm),
            Opcode::Slti => u32::from((a as i32) < simm),
            Opcode::Sltiu => u32::from(a < imm),
            Opcode::Xori => a ^ imm,
            Opcode::Ori => a | imm,
            Opcode::Andi => a & imm,
            Opcode::Slli => a << (imm & 0x1F),
            Opcode::Srli => a >> (imm & 0x1F),
            Opcode::Srai => ((a as i32) >> (imm & 0x1F)) as u32,
            Opcode::Add => a.wrapping_add(b),
            Opcode::Sub => a.wrapping_sub(b),
            Opcode::Sll => a << (b & 0x1F),
            Opcode::Slt => u32::from((a as i32) < (b as i32)),
            Opcode::Sltu => u32::from(a < b),
            Opcode::Xor => a ^ b,
            Opcode::Srl => a >> (b & 0x1F),
            Opcode::Sra => ((a as i32) >> (b & 0x1F)) as u32,
            Opcode::Or => a | b,
            Opcode::And => a & b,
            Opcode::Halt => a,
        };
        self.write(inst.rd, value);
        Ok(next)
    }

    /// Runs until the halt sentinel, or for at most `max_steps` instructions
    /// (0 = unlimited), in which case the exit code is 255.
    ///
    /// # Errors
    ///
    /// Any error from [`Interpreter::step`].
    pub fn run(&mut self, max_steps: u64) -> Result<u8, SimError> {
        loop {
            if max_steps != 0 && self.retired >= max_steps {
                tracing::warn!(steps = max_steps, "reference step cap reached without halt");
                return Ok(CYCLE_CAP_EXIT_CODE);
            }
            if let Some(code) = self.step()? {
                return Ok(code);
            }
        }
    }
}
