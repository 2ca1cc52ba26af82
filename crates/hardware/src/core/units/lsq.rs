//! Load/Store Queue.
//!
//! Holds memory-bound instructions in program order. Operand capture works as
//! in the reservation station, but only the head may leave: once both of its
//! operands are captured it computes `rs1 + imm`, truncates store data to the
//! access width and submits one request to memory. The slot is freed on
//! submission; completion is tracked by memory, keyed by ROB slot.
//!
//! The head is submitted only when:
//! 1. it was ready at the start of the tick,
//! 2. memory did not report `Busy` in the snapshot, and
//! 3. the queue did not submit in the previous tick (memory has not had the
//!    chance to report that request as busy yet).

use tracing::trace;

use crate::common::clocked::Reg;
use crate::common::constants::LSQ_SIZE;
use crate::common::error::SimError;
use crate::core::bus::{Bus, IssuePacket, LsqOutputs, MemRequest, MemStatus, RobTag};
use crate::core::traits::Unit;
use crate::core::units::alu::arithmetic::effective_address;
use crate::core::units::memory::{Direction, encode_kind};
use crate::core::units::operand::{Operand, resolve_pair};
use crate::core::units::reservation_station::SlotState;
use crate::isa::{ExecUnit, Opcode};

/// One queue entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LsqEntry {
    /// Slot lifecycle (shared with the reservation station).
    pub state: SlotState,
    /// Load or store class.
    pub op: Opcode,
    /// Base address operand (rs1).
    pub operand1: Operand,
    /// Store data operand (rs2); literal 0 for loads.
    pub operand2: Operand,
    /// Address offset.
    pub imm: u32,
    /// Owning ROB slot.
    pub rob: RobTag,
}

impl Default for LsqEntry {
    fn default() -> Self {
        Self {
            state: SlotState::Empty,
            op: Opcode::Lw,
            operand1: Operand::Pending,
            operand2: Operand::Pending,
            imm: 0,
            rob: RobTag::default(),
        }
    }
}

impl LsqEntry {
    fn from_issue(issue: &IssuePacket) -> Self {
        Self {
            state: SlotState::AwaitingOperands,
            op: issue.inst.op,
            operand1: Operand::Pending,
            operand2: Operand::Pending,
            imm: issue.inst.imm,
            rob: issue.rob,
        }
    }

    /// Builds the memory request for a ready entry.
    fn request(&self) -> Option<MemRequest> {
        let base = self.operand1.value()?;
        let data = self.operand2.value()?;
        let width = self.op.access_width();
        let (dir, data) = if self.op.is_store() {
            let mask = if width == 4 { u32::MAX } else { (1 << (8 * width)) - 1 };
            (Direction::Write, data & mask)
        } else {
            (Direction::Read, 0)
        };
        Some(MemRequest {
            kind: encode_kind(dir, width),
            addr: effective_address(base, self.imm),
            data,
            rob: self.rob,
            sign_extend: self.op.sign_extends(),
        })
    }
}

/// Circular FIFO plus dispatch bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LsqState {
    entries: [LsqEntry; LSQ_SIZE],
    head: usize,
    tail: usize,
    count: usize,
    accepted_last: Option<usize>,
    dispatched_last: bool,
}

impl Default for LsqState {
    fn default() -> Self {
        Self {
            entries: [LsqEntry::default(); LSQ_SIZE],
            head: 0,
            tail: 0,
            count: 0,
            accepted_last: None,
            dispatched_last: false,
        }
    }
}

impl LsqState {
    /// Number of occupied entries.
    #[inline]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Whether the queue is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of free entries.
    #[inline]
    pub const fn free_slots(&self) -> usize {
        LSQ_SIZE - self.count
    }

    /// Oldest entry.
    pub fn head(&self) -> Option<&LsqEntry> {
        (!self.is_empty()).then(|| &self.entries[self.head])
    }

    /// Iterates entries from head (oldest) to tail.
    pub fn iter(&self) -> impl Iterator<Item = &LsqEntry> {
        (0..self.count).map(move |i| &self.entries[(self.head + i) % LSQ_SIZE])
    }

    fn push(&mut self, entry: LsqEntry) -> Result<usize, SimError> {
        if self.count == LSQ_SIZE {
            return Err(SimError::CapacityExceeded {
                unit: "load/store queue",
            });
        }
        let idx = self.tail;
        self.entries[idx] = entry;
        self.tail = (self.tail + 1) % LSQ_SIZE;
        self.count += 1;
        Ok(idx)
    }

    fn pop(&mut self) {
        self.entries[self.head] = LsqEntry::default();
        self.head = (self.head + 1) % LSQ_SIZE;
        self.count -= 1;
    }
}

/// Load/store queue unit.
#[derive(Debug)]
pub struct LoadStoreQueue {
    state: Reg<LsqState>,
    out: Reg<LsqOutputs>,
}

impl Default for LoadStoreQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadStoreQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            state: Reg::new(LsqState::default()),
            out: Reg::new(LsqOutputs {
                free_slots: LSQ_SIZE,
                request: None,
            }),
        }
    }

    /// Outputs published at the last sync.
    pub fn outputs(&self) -> LsqOutputs {
        self.out.get()
    }

    /// State as of the last sync.
    pub fn state(&self) -> &LsqState {
        self.state.current()
    }
}

impl Unit for LoadStoreQueue {
    fn name(&self) -> &'static str {
        "lsq"
    }

    fn work(&mut self, bus: &Bus<'_>) -> Result<(), SimError> {
        if bus.csu.flush {
            self.state.set(LsqState::default())?;
            return self.out.set(LsqOutputs {
                free_slots: LSQ_SIZE,
                request: None,
            });
        }

        let cur = self.state.current();
        let mut next = *cur;

        let can_submit = !cur.dispatched_last && bus.mem.status != MemStatus::Busy;
        let request = cur
            .head()
            .filter(|e| can_submit && e.state == SlotState::Ready)
            .and_then(LsqEntry::request);
        if let Some(req) = &request {
            trace!(rob = req.rob.0, addr = req.addr, kind = req.kind, "lsq submit");
            next.pop();
        }
        next.dispatched_last = request.is_some();

        for i in 0..next.count {
            let idx = (next.head + i) % LSQ_SIZE;
            let entry = &mut next.entries[idx];
            if Some(idx) != cur.accepted_last && entry.state == SlotState::AwaitingOperands {
                entry.operand1.snoop(bus);
                entry.operand2.snoop(bus);
            }
        }

        if let Some(idx) = cur.accepted_last {
            let entry = &mut next.entries[idx];
            let (op1, op2) = resolve_pair(entry.rob, bus).ok_or_else(|| {
                SimError::Inconsistent(format!("no operand read for lsq slot {idx} (rob #{})", entry.rob.0))
            })?;
            entry.operand1 = op1;
            entry.operand2 = op2;
        }

        next.accepted_last = None;
        if let Some(issue) = bus.csu.issue.filter(|p| p.unit() == ExecUnit::Memory) {
            next.accepted_last = Some(next.push(LsqEntry::from_issue(&issue))?);
        }

        for i in 0..next.count {
            let entry = &mut next.entries[(next.head + i) % LSQ_SIZE];
            if entry.state == SlotState::AwaitingOperands
                && entry.operand1.is_ready()
                && entry.operand2.is_ready()
            {
                entry.state = SlotState::Ready;
            }
        }

        let free_slots = next.free_slots();
        self.state.set(next)?;
        self.out.set(LsqOutputs {
            free_slots,
            request,
        })
    }

    fn sync(&mut self) {
        self.state.sync();
        self.out.sync();
    }
}
