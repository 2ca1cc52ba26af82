//! Central Schedule Unit (CSU).
//!
//! The CSU owns the reorder buffer and the fetch PC. Every tick it works on a
//! copy of its pre-tick state in this order:
//! 1. **Commit:** retire the head if it is `ReadyToCommit`; publish the commit
//!    packet, advance the architectural PC and latch the halt signal.
//! 2. **Flush:** if the retired entry was mispredicted, reset the ROB and the
//!    fetch PC, publish `flush` and stop for this tick.
//! 3. **Completion Forwarding:** store the ALU and memory broadcasts into their
//!    `Executing` entries; JALR results redirect fetch for the next tick.
//! 4. **Issue:** fetch and decode at the speculated PC, check ROB and target
//!    unit capacity, allocate the tail entry and broadcast the issue packet.
//! 5. **Backfill:** publish values older ROB entries already hold for the
//!    sources of the instruction issued last tick.
//! 6. **Age:** entries issued last tick become `Executing`.

/// Reorder buffer.
pub mod rob;

use tracing::debug;

use self::rob::{Rob, RobEntry, RobState};
use crate::common::clocked::Reg;
use crate::common::constants::{INSTRUCTION_SIZE, ROB_SIZE};
use crate::common::error::SimError;
use crate::config::BranchPrediction;
use crate::core::bus::{
    Bus, CommitPacket, CsuOutputs, HaltSignal, IssuePacket, MemFault, OperandForward, RobTag,
    StallCause,
};
use crate::core::traits::Unit;
use crate::isa::{ExecUnit, Opcode, decode};

/// Sources of the instruction issued in the previous tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LastIssue {
    rob: RobTag,
    unit: ExecUnit,
    rs1: Option<u8>,
    rs2: Option<u8>,
}

/// Fetch and control state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Control {
    /// Next instruction to fetch.
    spec_pc: u32,
    /// PC after the last committed instruction.
    actual_pc: u32,
    /// A JALR is in flight; fetch waits for its target.
    jalr_stall: bool,
    /// A halt is in flight; nothing after it is fetched.
    halt_issued: bool,
    last_issue: Option<LastIssue>,
}

/// Central schedule unit.
#[derive(Debug)]
pub struct Csu {
    rob: Reg<Rob>,
    ctl: Reg<Control>,
    out: Reg<CsuOutputs>,
    prediction: BranchPrediction,
}

impl Csu {
    /// Creates a CSU that starts fetching at `start_pc`.
    pub fn new(start_pc: u32, prediction: BranchPrediction) -> Self {
        Self {
            rob: Reg::new(Rob::new()),
            ctl: Reg::new(Control {
                spec_pc: start_pc,
                actual_pc: start_pc,
                jalr_stall: false,
                halt_issued: false,
                last_issue: None,
            }),
            out: Reg::new(CsuOutputs::default()),
            prediction,
        }
    }

    /// Outputs published at the last sync.
    pub fn outputs(&self) -> CsuOutputs {
        self.out.get()
    }

    /// Reorder buffer as of the last sync.
    pub fn rob(&self) -> &Rob {
        self.rob.current()
    }

    /// Architectural PC (after the last committed instruction).
    pub fn actual_pc(&self) -> u32 {
        self.ctl.current().actual_pc
    }

    /// Speculated fetch PC.
    pub fn speculated_pc(&self) -> u32 {
        self.ctl.current().spec_pc
    }

    /// Static guess for a conditional branch at `pc` with offset `imm`.
    const fn predict(&self, pc: u32, imm: u32) -> u32 {
        let taken = match self.prediction {
            BranchPrediction::NotTaken => false,
            BranchPrediction::Taken => true,
            BranchPrediction::BackwardTaken => (imm as i32) < 0,
        };
        if taken {
            pc.wrapping_add(imm)
        } else {
            pc.wrapping_add(INSTRUCTION_SIZE)
        }
    }

    /// Stores a completion into its entry if that entry was `Executing`.
    fn complete(
        cur: &Rob,
        rob: &mut Rob,
        ctl: &mut Control,
        tag: RobTag,
        value: u32,
        next_pc: Option<u32>,
        fault: Option<MemFault>,
    ) {
        if cur.get(tag).state != RobState::Executing {
            return;
        }
        let e = rob.get_mut(tag);
        e.value = value;
        e.fault = fault;
        e.state = RobState::ReadyToCommit;
        if let Some(next) = next_pc {
            e.resolved_pc = Some(next);
            if e.op() == Opcode::Jalr {
                debug!(rob = tag.0, target = next, "jalr redirect");
                ctl.spec_pc = next;
                ctl.jalr_stall = false;
            } else {
                e.mismatch = next != e.speculated_pc;
            }
        }
    }

    /// Issue step. Returns the packet and the stall cause if nothing issued.
    fn issue(
        &self,
        bus: &Bus<'_>,
        cur: &Control,
        cur_rob: &Rob,
        rob: &mut Rob,
        ctl: &mut Control,
    ) -> Result<(Option<IssuePacket>, Option<StallCause>), SimError> {
        if cur.halt_issued {
            return Ok((None, Some(StallCause::Halted)));
        }
        if cur.jalr_stall {
            return Ok((None, Some(StallCause::JalrPending)));
        }

        let pc = cur.spec_pc;
        let word = bus.ram.fetch(pc);
        let Some(inst) = word.and_then(decode) else {
            // Off the architectural path this is only a wrong-path fetch.
            if cur_rob.is_empty() {
                return Err(SimError::IllegalInstruction {
                    pc,
                    word: word.unwrap_or(0),
                });
            }
            return Ok((None, Some(StallCause::Undecodable)));
        };

        let unit = inst.op.exec_unit();
        let (published, full) = match unit {
            ExecUnit::Alu => (bus.rs.free_slots, StallCause::RsFull),
            ExecUnit::Memory => (bus.lsq.free_slots, StallCause::LsqFull),
        };
        // The unit has not counted last tick's issue yet.
        let in_flight = usize::from(cur.last_issue.is_some_and(|l| l.unit == unit));
        if cur_rob.len() >= ROB_SIZE {
            return Ok((None, Some(StallCause::RobFull)));
        }
        if published.saturating_sub(in_flight) == 0 {
            return Ok((None, Some(full)));
        }

        let fallthrough = pc.wrapping_add(INSTRUCTION_SIZE);
        let speculated_pc = match inst.op {
            Opcode::Jal => pc.wrapping_add(inst.imm),
            Opcode::Jalr => {
                ctl.jalr_stall = true;
                fallthrough
            }
            Opcode::Halt => {
                ctl.halt_issued = true;
                fallthrough
            }
            op if op.is_branch() => self.predict(pc, inst.imm),
            _ => fallthrough,
        };
        // Memory instructions never redirect.
        let resolved_pc = (unit == ExecUnit::Memory).then_some(fallthrough);

        let tag = rob
            .allocate(RobEntry {
                state: RobState::Issued,
                pc,
                inst,
                value: 0,
                speculated_pc,
                resolved_pc,
                mismatch: false,
                fault: None,
            })
            .ok_or_else(|| SimError::Inconsistent("rob allocation failed below capacity".into()))?;
        ctl.spec_pc = speculated_pc;
        ctl.last_issue = Some(LastIssue {
            rob: tag,
            unit,
            rs1: inst.rs1,
            rs2: inst.rs2,
        });

        debug!(rob = tag.0, pc, op = inst.op.mnemonic(), next = speculated_pc, "issue");
        Ok((
            Some(IssuePacket {
                rob: tag,
                pc,
                inst,
                speculated_pc,
            }),
            None,
        ))
    }

    /// Values older ROB entries hold for the sources of the last issue.
    fn backfill(bus: &Bus<'_>, cur_rob: &Rob, last: &LastIssue) -> OperandForward {
        let lookup = |reg: Option<u8>| {
            let (tag, producer) = cur_rob.find_latest_producer(last.rob, reg?)?;
            if producer.state == RobState::ReadyToCommit {
                Some(producer.value)
            } else {
                bus.broadcast_for(tag)
            }
        };
        OperandForward {
            rob: last.rob,
            rs1: lookup(last.rs1),
            rs2: lookup(last.rs2),
        }
    }
}

impl Unit for Csu {
    fn name(&self) -> &'static str {
        "csu"
    }

    fn work(&mut self, bus: &Bus<'_>) -> Result<(), SimError> {
        let cur_rob = self.rob.current();
        let cur = *self.ctl.current();
        let mut rob = *cur_rob;
        let mut ctl = cur;
        let mut out = CsuOutputs {
            halt: self.out.current().halt,
            ..CsuOutputs::default()
        };

        // 1. Commit.
        let mut flush = false;
        if let Some((tag, e)) = rob.commit_head() {
            if let Some(MemFault { addr, width }) = e.fault {
                return Err(SimError::AddressOutOfRange { addr, width });
            }
            let next = e.resolved_pc.ok_or_else(|| {
                SimError::Inconsistent(format!("rob #{} committed without a resolved pc", tag.0))
            })?;
            ctl.actual_pc = next;
            out.commit = Some(CommitPacket {
                rob: tag,
                op: e.op(),
                rd: e.rd(),
                value: e.value,
            });
            debug!(rob = tag.0, pc = e.pc, op = e.op().mnemonic(), value = e.value, "commit");
            #[cfg(feature = "commit-log")]
            tracing::info!(
                pc = e.pc,
                inst = %crate::isa::disasm::disassemble(e.inst.raw),
                value = e.value,
                "retired"
            );
            if e.op() == Opcode::Halt {
                out.halt = HaltSignal::halted(e.value as u8);
                debug!(code = e.value & 0xFF, "halt committed");
            }
            flush = e.mismatch;
        }

        // 2. Flush.
        if flush {
            debug!(pc = ctl.actual_pc, squashed = rob.len(), "flush");
            rob.flush_all();
            ctl.spec_pc = ctl.actual_pc;
            ctl.jalr_stall = false;
            ctl.halt_issued = false;
            ctl.last_issue = None;
            out.flush = true;
            self.rob.set(rob)?;
            self.ctl.set(ctl)?;
            return self.out.set(out);
        }

        // 3. Completion forwarding.
        if let Some(c) = bus.alu.completion {
            Self::complete(cur_rob, &mut rob, &mut ctl, c.rob, c.value, Some(c.next_pc), None);
        }
        if let Some((tag, data)) = bus.mem.ready() {
            Self::complete(cur_rob, &mut rob, &mut ctl, tag, data, None, bus.mem.fault);
        }

        // 4. Issue.
        ctl.last_issue = None;
        let (issue, stall) = self.issue(bus, &cur, cur_rob, &mut rob, &mut ctl)?;
        out.issue = issue;
        out.stall = stall;

        // 5. Backfill.
        out.forward = cur
            .last_issue
            .as_ref()
            .map(|last| Self::backfill(bus, cur_rob, last));

        // 6. Age.
        for (tag, e) in cur_rob.iter() {
            if e.state == RobState::Issued {
                rob.get_mut(tag).state = RobState::Executing;
            }
        }

        rob.check()?;
        self.rob.set(rob)?;
        self.ctl.set(ctl)?;
        self.out.set(out)
    }

    fn sync(&mut self) {
        self.rob.sync();
        self.ctl.sync();
        self.out.sync();
    }
}
