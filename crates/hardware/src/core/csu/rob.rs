//! Reorder Buffer (ROB) for in-order commit.
//!
//! The ROB is a circular buffer of 32 entries that tracks in-flight
//! instructions from issue through commit. It provides:
//! 1. **Allocation:** Assigns the tail slot to each issued instruction.
//! 2. **Completion:** Stores results and the resolved next PC.
//! 3. **In-order Commit:** Retires instructions from the head in program order.
//! 4. **Forwarding:** Finds the latest older producer of a register.
//! 5. **Flush:** Squashes every entry after a misprediction.
//!
//! An entry only moves `Empty -> Issued -> Executing -> ReadyToCommit -> Empty`.

use crate::common::constants::ROB_SIZE;
use crate::common::error::SimError;
use crate::core::bus::{MemFault, RobTag};
use crate::isa::{Decoded, Opcode};

/// Lifecycle state of an ROB entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RobState {
    /// Slot is free.
    #[default]
    Empty,
    /// Allocated this tick; not yet visible to completion forwarding.
    Issued,
    /// Waiting for an ALU or memory result.
    Executing,
    /// Result available, waiting to reach the head.
    ReadyToCommit,
}

/// A single entry in the Reorder Buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RobEntry {
    /// Current lifecycle state.
    pub state: RobState,
    /// Program counter of the instruction.
    pub pc: u32,
    /// Decoded instruction (including the raw word).
    pub inst: Decoded,
    /// Result value (ALU output, load data, or link address).
    pub value: u32,
    /// Next PC the front end speculated at issue.
    pub speculated_pc: u32,
    /// Architectural next PC, once resolved.
    pub resolved_pc: Option<u32>,
    /// Resolved next PC disagrees with the speculated one.
    pub mismatch: bool,
    /// Out-of-range data access, raised when the entry commits.
    pub fault: Option<MemFault>,
}

impl Default for RobEntry {
    fn default() -> Self {
        Self {
            state: RobState::Empty,
            pc: 0,
            inst: Decoded {
                raw: 0,
                op: Opcode::Addi,
                rd: None,
                rs1: None,
                rs2: None,
                imm: 0,
            },
            value: 0,
            speculated_pc: 0,
            resolved_pc: None,
            mismatch: false,
            fault: None,
        }
    }
}

impl RobEntry {
    /// Destination register, if any.
    #[inline]
    pub const fn rd(&self) -> Option<u8> {
        self.inst.rd
    }

    /// Instruction class.
    #[inline]
    pub const fn op(&self) -> Opcode {
        self.inst.op
    }
}

/// Reorder Buffer: circular buffer for in-order commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rob {
    /// Fixed-size entry array.
    entries: [RobEntry; ROB_SIZE],
    /// Index of the oldest entry (commit point).
    head: usize,
    /// Index where the next entry will be allocated.
    tail: usize,
    /// Number of occupied entries.
    count: usize,
}

impl Default for Rob {
    fn default() -> Self {
        Self::new()
    }
}

impl Rob {
    /// Creates an empty ROB.
    pub fn new() -> Self {
        Self {
            entries: [RobEntry::default(); ROB_SIZE],
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Returns the ROB capacity.
    #[inline]
    pub const fn capacity(&self) -> usize {
        ROB_SIZE
    }

    /// Returns the number of occupied entries.
    #[inline]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the ROB is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns true if the ROB is full.
    #[inline]
    pub const fn is_full(&self) -> bool {
        self.count == ROB_SIZE
    }

    /// Returns the number of free slots.
    #[inline]
    pub const fn free_slots(&self) -> usize {
        ROB_SIZE - self.count
    }

    /// Tag of the oldest entry.
    #[inline]
    pub const fn head_tag(&self) -> RobTag {
        RobTag(self.head as u8)
    }

    /// Allocates the tail entry in state `Issued`. Returns `None` if the ROB is full.
    pub fn allocate(&mut self, mut entry: RobEntry) -> Option<RobTag> {
        if self.is_full() {
            return None;
        }
        let tag = RobTag(self.tail as u8);
        entry.state = RobState::Issued;
        self.entries[self.tail] = entry;
        self.tail = (self.tail + 1) % ROB_SIZE;
        self.count += 1;
        Some(tag)
    }

    /// Returns the entry in slot `tag`, occupied or not.
    #[inline]
    pub fn get(&self, tag: RobTag) -> &RobEntry {
        &self.entries[tag.slot()]
    }

    /// Returns the entry in slot `tag` mutably.
    #[inline]
    pub fn get_mut(&mut self, tag: RobTag) -> &mut RobEntry {
        &mut self.entries[tag.slot()]
    }

    /// Returns a reference to the head entry (oldest), if the ROB is non-empty.
    pub fn peek_head(&self) -> Option<&RobEntry> {
        (!self.is_empty()).then(|| &self.entries[self.head])
    }

    /// Retires the head entry if it is `ReadyToCommit`.
    pub fn commit_head(&mut self) -> Option<(RobTag, RobEntry)> {
        if self.peek_head()?.state != RobState::ReadyToCommit {
            return None;
        }
        let tag = self.head_tag();
        let committed = self.entries[self.head];
        self.entries[self.head] = RobEntry::default();
        self.head = (self.head + 1) % ROB_SIZE;
        self.count -= 1;
        Some((tag, committed))
    }

    /// Flushes all entries from the ROB.
    pub fn flush_all(&mut self) {
        *self = Self::new();
    }

    /// Iterates occupied entries from head (oldest) to tail.
    pub fn iter(&self) -> impl Iterator<Item = (RobTag, &RobEntry)> {
        (0..self.count).map(move |i| {
            let idx = (self.head + i) % ROB_SIZE;
            (RobTag(idx as u8), &self.entries[idx])
        })
    }

    /// Finds the latest entry older than `before` that writes `reg`.
    pub fn find_latest_producer(&self, before: RobTag, reg: u8) -> Option<(RobTag, &RobEntry)> {
        self.iter()
            .take_while(|(tag, _)| *tag != before)
            .filter(|(_, e)| e.rd() == Some(reg))
            .last()
    }

    /// Checks that the occupancy counter matches the entry states.
    ///
    /// # Errors
    ///
    /// [`SimError::Inconsistent`] if they disagree.
    pub fn check(&self) -> Result<(), SimError> {
        let live = self
            .entries
            .iter()
            .filter(|e| e.state != RobState::Empty)
            .count();
        if live != self.count {
            return Err(SimError::Inconsistent(format!(
                "rob holds {live} live entries but counts {}",
                self.count
            )));
        }
        Ok(())
    }
}
