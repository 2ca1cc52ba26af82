//! Architectural Register File with producer tracking.
//!
//! Holds the 32 committed integer registers and, for each one, the ROB slot of
//! its latest in-flight producer (`None` when the committed value is current).
//! Register x0 is hardwired to zero and never tracked.
//!
//! Per tick, in this order:
//! 1. **Commit Write:** apply the CSU commit packet; the producer tag is cleared
//!    only if it still names the committing slot (a newer producer wins).
//! 2. **Flush:** drop every producer tag; committed values are kept.
//! 3. **Issue Read:** answer rs1/rs2 status for the instruction issued in the
//!    snapshot. Reading after step 1 bypasses a same-tick commit.
//! 4. **Issue Write:** record the issued instruction as rd's producer.

use tracing::trace;

use crate::common::clocked::Reg;
use crate::common::constants::NUM_REGS;
use crate::common::error::SimError;
use crate::core::bus::{Bus, CommitPacket, OperandRead, RegFileOutputs, RobTag};
use crate::core::traits::Unit;
use crate::core::units::operand::Operand;

/// Committed values and producer tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegState {
    values: [u32; NUM_REGS],
    producers: [Option<RobTag>; NUM_REGS],
}

impl Default for RegState {
    fn default() -> Self {
        Self {
            values: [0; NUM_REGS],
            producers: [None; NUM_REGS],
        }
    }
}

impl RegState {
    /// Committed value of register `idx`.
    #[inline]
    pub fn value(&self, idx: usize) -> u32 {
        self.values[idx]
    }

    /// Latest in-flight producer of register `idx`.
    #[inline]
    pub fn producer(&self, idx: usize) -> Option<RobTag> {
        self.producers[idx]
    }

    /// Operand status of a source register; x0 and unused fields read as 0.
    pub fn read(&self, reg: Option<u8>) -> Operand {
        match reg.map(usize::from) {
            None | Some(0) => Operand::Value(0),
            Some(r) => self.producers[r].map_or(Operand::Value(self.values[r]), Operand::Waiting),
        }
    }

    /// Records `rob` as the latest producer of `rd`. No-op for x0.
    pub fn set_producer(&mut self, rd: u8, rob: RobTag) {
        if rd != 0 {
            self.producers[rd as usize] = Some(rob);
        }
    }

    /// Applies a committed result.
    ///
    /// The producer tag is cleared only if it still names the committing
    /// slot; otherwise a younger instruction owns the register.
    pub fn commit_write(&mut self, commit: &CommitPacket) {
        let Some(rd) = commit.rd.map(usize::from).filter(|&r| r != 0) else {
            return;
        };
        self.values[rd] = commit.value;
        if self.producers[rd] == Some(commit.rob) {
            self.producers[rd] = None;
        }
    }

    /// Drops every in-flight producer tag.
    pub fn flush(&mut self) {
        self.producers = [None; NUM_REGS];
    }

    /// Whether any register has an in-flight producer.
    pub fn has_producers(&self) -> bool {
        self.producers.iter().any(Option::is_some)
    }
}

/// Register file unit.
#[derive(Debug)]
pub struct RegisterFile {
    state: Reg<RegState>,
    out: Reg<RegFileOutputs>,
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    /// Creates a register file with all registers zero and untracked.
    pub fn new() -> Self {
        Self {
            state: Reg::new(RegState::default()),
            out: Reg::new(RegFileOutputs::default()),
        }
    }

    /// Outputs published at the last sync.
    pub fn outputs(&self) -> RegFileOutputs {
        self.out.get()
    }

    /// State as of the last sync.
    pub fn state(&self) -> &RegState {
        self.state.current()
    }

    /// Committed value of register `idx` (x0 reads 0).
    pub fn value(&self, idx: usize) -> u32 {
        self.state.current().value(idx)
    }
}

impl Unit for RegisterFile {
    fn name(&self) -> &'static str {
        "regfile"
    }

    fn work(&mut self, bus: &Bus<'_>) -> Result<(), SimError> {
        let mut st = self.state.get();

        if let Some(commit) = &bus.csu.commit {
            st.commit_write(commit);
        }

        if bus.csu.flush {
            st.flush();
            self.state.set(st)?;
            return self.out.set(RegFileOutputs::default());
        }

        let read = bus.csu.issue.map(|issue| {
            let read = OperandRead {
                rob: issue.rob,
                rs1: st.read(issue.inst.rs1),
                rs2: st.read(issue.inst.rs2),
            };
            if let Some(rd) = issue.inst.rd {
                st.set_producer(rd, issue.rob);
            }
            trace!(rob = issue.rob.0, rs1 = ?read.rs1, rs2 = ?read.rs2, "operand read");
            read
        });

        self.state.set(st)?;
        self.out.set(RegFileOutputs { read })
    }

    fn sync(&mut self) {
        self.state.sync();
        self.out.sync();
    }
}
