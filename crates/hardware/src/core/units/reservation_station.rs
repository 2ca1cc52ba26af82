//! Reservation Station.
//!
//! Holds ALU-bound instructions until both operands are captured. Any ready
//! slot may dispatch; the lowest index ready at the start of the tick wins and
//! at most one instruction leaves per tick. Operands are captured as described
//! in [`operand`](crate::core::units::operand): the slot accepted last tick is
//! resolved against the register file answer and the ROB backfill, all other
//! waiting operands snoop the ALU and memory broadcasts.

use tracing::trace;

use crate::common::clocked::Reg;
use crate::common::constants::RS_SIZE;
use crate::common::error::SimError;
use crate::core::bus::{AluRequest, Bus, IssuePacket, RobTag, RsOutputs};
use crate::core::traits::Unit;
use crate::core::units::operand::{Operand, resolve_pair};
use crate::isa::{ExecUnit, Opcode};

/// Lifecycle of a reservation station slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SlotState {
    /// Free.
    #[default]
    Empty,
    /// Holding an instruction with at least one operand missing.
    AwaitingOperands,
    /// Both operands captured; eligible for dispatch.
    Ready,
}

/// One reservation station slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Station {
    /// Slot lifecycle.
    pub state: SlotState,
    /// Instruction class.
    pub op: Opcode,
    /// First operand.
    pub operand1: Operand,
    /// Second operand.
    pub operand2: Operand,
    /// Immediate or shift amount.
    pub imm: u32,
    /// Program counter of the instruction.
    pub pc: u32,
    /// Owning ROB slot.
    pub rob: RobTag,
}

impl Default for Station {
    fn default() -> Self {
        Self {
            state: SlotState::Empty,
            op: Opcode::Addi,
            operand1: Operand::Pending,
            operand2: Operand::Pending,
            imm: 0,
            pc: 0,
            rob: RobTag::default(),
        }
    }
}

impl Station {
    fn from_issue(issue: &IssuePacket) -> Self {
        Self {
            state: SlotState::AwaitingOperands,
            op: issue.inst.op,
            operand1: Operand::Pending,
            operand2: Operand::Pending,
            imm: issue.inst.imm,
            pc: issue.pc,
            rob: issue.rob,
        }
    }

    /// Promotes the slot to `Ready` once both operands are captured.
    fn update_state(&mut self) {
        if self.state == SlotState::AwaitingOperands
            && self.operand1.is_ready()
            && self.operand2.is_ready()
        {
            self.state = SlotState::Ready;
        }
    }

    fn snoop(&mut self, bus: &Bus<'_>) {
        if self.state == SlotState::AwaitingOperands {
            self.operand1.snoop(bus);
            self.operand2.snoop(bus);
        }
    }
}

/// Slots plus the index accepted in the previous tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RsState {
    slots: [Station; RS_SIZE],
    accepted_last: Option<usize>,
}

impl Default for RsState {
    fn default() -> Self {
        Self {
            slots: [Station::default(); RS_SIZE],
            accepted_last: None,
        }
    }
}

impl RsState {
    /// All slots.
    pub fn slots(&self) -> &[Station] {
        &self.slots
    }

    /// Number of empty slots.
    pub fn free_slots(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.state == SlotState::Empty)
            .count()
    }

    /// Number of occupied slots.
    pub fn occupancy(&self) -> usize {
        RS_SIZE - self.free_slots()
    }
}

/// Reservation station unit.
#[derive(Debug)]
pub struct ReservationStation {
    state: Reg<RsState>,
    out: Reg<RsOutputs>,
}

impl Default for ReservationStation {
    fn default() -> Self {
        Self::new()
    }
}

impl ReservationStation {
    /// Creates an empty reservation station.
    pub fn new() -> Self {
        Self {
            state: Reg::new(RsState::default()),
            out: Reg::new(RsOutputs {
                free_slots: RS_SIZE,
                request: None,
            }),
        }
    }

    /// Outputs published at the last sync.
    pub fn outputs(&self) -> RsOutputs {
        self.out.get()
    }

    /// State as of the last sync.
    pub fn state(&self) -> &RsState {
        self.state.current()
    }
}

impl Unit for ReservationStation {
    fn name(&self) -> &'static str {
        "rs"
    }

    fn work(&mut self, bus: &Bus<'_>) -> Result<(), SimError> {
        if bus.csu.flush {
            self.state.set(RsState::default())?;
            return self.out.set(RsOutputs {
                free_slots: RS_SIZE,
                request: None,
            });
        }

        let cur = self.state.current();
        let mut next = *cur;

        // Dispatch: lowest-index slot that was ready at the start of the tick.
        let request = cur
            .slots
            .iter()
            .position(|s| s.state == SlotState::Ready)
            .and_then(|i| {
                let s = cur.slots[i];
                next.slots[i] = Station::default();
                Some(AluRequest {
                    op: s.op,
                    operand1: s.operand1.value()?,
                    operand2: s.operand2.value()?,
                    imm: s.imm,
                    pc: s.pc,
                    rob: s.rob,
                })
            });
        if let Some(req) = &request {
            trace!(rob = req.rob.0, op = req.op.mnemonic(), "rs dispatch");
        }

        // Snoop: every waiting operand except the slot accepted last tick.
        for (i, slot) in next.slots.iter_mut().enumerate() {
            if Some(i) != cur.accepted_last {
                slot.snoop(bus);
            }
        }

        // Resolve the slot accepted last tick.
        if let Some(i) = cur.accepted_last {
            let slot = &mut next.slots[i];
            let (op1, op2) = resolve_pair(slot.rob, bus).ok_or_else(|| {
                SimError::Inconsistent(format!("no operand read for rs slot {i} (rob #{})", slot.rob.0))
            })?;
            slot.operand1 = op1;
            slot.operand2 = op2;
        }

        // Accept the instruction issued in the snapshot.
        next.accepted_last = None;
        if let Some(issue) = bus.csu.issue.filter(|p| p.unit() == ExecUnit::Alu) {
            let i = next
                .slots
                .iter()
                .position(|s| s.state == SlotState::Empty)
                .ok_or(SimError::CapacityExceeded {
                    unit: "reservation station",
                })?;
            next.slots[i] = Station::from_issue(&issue);
            next.accepted_last = Some(i);
        }

        for slot in &mut next.slots {
            slot.update_state();
        }

        let free_slots = next.free_slots();
        self.state.set(next)?;
        self.out.set(RsOutputs {
            free_slots,
            request,
        })
    }

    fn sync(&mut self) {
        self.state.sync();
        self.out.sync();
    }
}
