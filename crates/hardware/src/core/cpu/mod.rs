//! CPU Core Definition and Tick Driver.
//!
//! This module defines the central `Cpu` structure, which owns the six units
//! and the RAM they share. One call to [`Cpu::step`] is one clock tick:
//! 1. **Snapshot:** capture every unit's published outputs into a [`Bus`].
//! 2. **Evaluate:** run `work` on every unit, in the order given by the caller.
//! 3. **Sync:** publish all staged state at once.
//! 4. **RAM:** apply the byte writes memory staged during the tick.
//!
//! Because every unit reads only the snapshot, the evaluation order never
//! changes the result; the simulator may shuffle it to prove that.

use crate::common::error::SimError;
use crate::config::Config;
use crate::core::bus::Bus;
use crate::core::csu::Csu;
use crate::core::traits::Unit;
use crate::core::units::alu::Alu;
use crate::core::units::lsq::LoadStoreQueue;
use crate::core::units::memory::Memory;
use crate::core::units::memory::ram::Ram;
use crate::core::units::register_file::RegisterFile;
use crate::core::units::reservation_station::ReservationStation;

/// Number of clocked units.
pub const UNIT_COUNT: usize = 6;

/// Evaluation order used when shuffling is off.
pub const FIXED_ORDER: [usize; UNIT_COUNT] = [0, 1, 2, 3, 4, 5];

/// Processor state: the six clocked units plus committed RAM.
#[derive(Debug)]
pub struct Cpu {
    csu: Csu,
    regfile: RegisterFile,
    rs: ReservationStation,
    lsq: LoadStoreQueue,
    alu: Alu,
    memory: Memory,
    ram: Ram,
}

impl Cpu {
    /// Creates a CPU around a loaded RAM image.
    pub fn new(config: &Config, ram: Ram) -> Self {
        Self {
            csu: Csu::new(config.general.start_pc, config.pipeline.branch_prediction),
            regfile: RegisterFile::new(),
            rs: ReservationStation::new(),
            lsq: LoadStoreQueue::new(),
            alu: Alu::new(),
            memory: Memory::new(),
            ram,
        }
    }

    /// Advances every unit by one tick.
    ///
    /// `order` lists unit indices (CSU, register file, RS, LSQ, ALU, memory)
    /// in the order their `work` runs.
    ///
    /// # Errors
    ///
    /// Returns the first protocol fault any unit reports. The machine state is
    /// unspecified afterwards.
    pub fn step(&mut self, order: &[usize; UNIT_COUNT]) -> Result<(), SimError> {
        let bus = Bus {
            csu: self.csu.outputs(),
            regfile: self.regfile.outputs(),
            rs: self.rs.outputs(),
            lsq: self.lsq.outputs(),
            alu: self.alu.outputs(),
            mem: self.memory.outputs(),
            ram: &self.ram,
        };
        let mut units: [&mut dyn Unit; UNIT_COUNT] = [
            &mut self.csu,
            &mut self.regfile,
            &mut self.rs,
            &mut self.lsq,
            &mut self.alu,
            &mut self.memory,
        ];
        for &i in order {
            let unit = units
                .get_mut(i)
                .ok_or_else(|| SimError::Inconsistent(format!("no unit with index {i}")))?;
            unit.work(&bus)?;
        }
        for unit in &mut units {
            unit.sync();
        }

        let writes = self.memory.take_ram_writes();
        self.ram.apply(writes)
    }

    /// Exit code, once the halt sentinel has committed.
    pub fn halt_code(&self) -> Option<u8> {
        self.csu.outputs().halt.exit_code()
    }

    /// Central schedule unit.
    pub const fn csu(&self) -> &Csu {
        &self.csu
    }

    /// Register file.
    pub const fn regfile(&self) -> &RegisterFile {
        &self.regfile
    }

    /// Reservation station.
    pub const fn rs(&self) -> &ReservationStation {
        &self.rs
    }

    /// Load/store queue.
    pub const fn lsq(&self) -> &LoadStoreQueue {
        &self.lsq
    }

    /// ALU.
    pub const fn alu(&self) -> &Alu {
        &self.alu
    }

    /// Data memory unit.
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Committed RAM contents.
    pub const fn ram(&self) -> &Ram {
        &self.ram
    }
}
