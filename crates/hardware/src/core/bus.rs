//! Inter-unit signals and the per-tick snapshot.
//!
//! Units never reference each other. Each one publishes a small `Copy` output
//! struct at the end of a tick, and the driver captures all six into a [`Bus`]
//! before the next tick starts. Every unit's `work` reads only this snapshot,
//! which is what makes the evaluation order irrelevant.
//!
//! Signal flow per tick:
//! 1. **CSU:** issue packet, operand backfill, commit packet, flush, halt.
//! 2. **Register File:** operand status for the instruction issued last tick.
//! 3. **Reservation Station / LSQ:** free slot counts and at most one dispatch each.
//! 4. **ALU / Memory:** at most one completion broadcast each.

use crate::common::constants::HALT_MARKER;
use crate::core::units::memory::ram::Ram;
use crate::core::units::operand::Operand;
use crate::isa::{Decoded, ExecUnit, Opcode};

/// Index of a reorder buffer slot; names an in-flight instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct RobTag(pub u8);

impl RobTag {
    /// The slot index as a `usize`.
    #[inline]
    pub const fn slot(self) -> usize {
        self.0 as usize
    }
}

/// Issue metadata broadcast by the CSU to the RS, LSQ and register file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IssuePacket {
    /// ROB slot allocated to the instruction.
    pub rob: RobTag,
    /// Program counter of the instruction.
    pub pc: u32,
    /// Decoded fields.
    pub inst: Decoded,
    /// Next PC the front end speculated.
    pub speculated_pc: u32,
}

impl IssuePacket {
    /// Execution path of the issued instruction.
    #[inline]
    pub const fn unit(&self) -> ExecUnit {
        self.inst.op.exec_unit()
    }
}

/// Values the CSU found in the ROB for the instruction issued last tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OperandForward {
    /// Instruction the values belong to.
    pub rob: RobTag,
    /// Value of rs1, if an in-flight producer already had it.
    pub rs1: Option<u32>,
    /// Value of rs2, if an in-flight producer already had it.
    pub rs2: Option<u32>,
}

/// Retirement of the ROB head.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitPacket {
    /// Retired ROB slot.
    pub rob: RobTag,
    /// Instruction class of the retired entry.
    pub op: Opcode,
    /// Destination register written, if any.
    pub rd: Option<u8>,
    /// Result value.
    pub value: u32,
}

/// Packed halt signal: bit 8 is the halted marker, bits 0-7 the exit code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HaltSignal(pub u16);

impl HaltSignal {
    /// A raised signal carrying `code`.
    #[inline]
    pub const fn halted(code: u8) -> Self {
        Self(HALT_MARKER | code as u16)
    }

    /// Whether the marker bit is set.
    #[inline]
    pub const fn is_halted(self) -> bool {
        self.0 & HALT_MARKER != 0
    }

    /// Exit code, if the marker bit is set.
    #[inline]
    pub const fn exit_code(self) -> Option<u8> {
        if self.is_halted() {
            Some((self.0 & 0xFF) as u8)
        } else {
            None
        }
    }
}

/// Reason the CSU did not issue this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StallCause {
    /// All 32 ROB entries are occupied.
    RobFull,
    /// The reservation station has no free slot.
    RsFull,
    /// The load/store queue has no free slot.
    LsqFull,
    /// A JALR target is not resolved yet.
    JalrPending,
    /// The word at the speculated PC does not decode.
    Undecodable,
    /// A halt has been issued; nothing follows it.
    Halted,
}

/// Everything the CSU publishes in one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CsuOutputs {
    /// Instruction issued this tick.
    pub issue: Option<IssuePacket>,
    /// ROB backfill for the instruction issued last tick.
    pub forward: Option<OperandForward>,
    /// Head retirement.
    pub commit: Option<CommitPacket>,
    /// Pipeline flush; every other unit clears its in-flight state next tick.
    pub flush: bool,
    /// Sticky halt signal.
    pub halt: HaltSignal,
    /// Why nothing was issued, if nothing was.
    pub stall: Option<StallCause>,
}

/// Operand status answered by the register file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperandRead {
    /// Instruction the answer belongs to.
    pub rob: RobTag,
    /// First source operand.
    pub rs1: Operand,
    /// Second source operand.
    pub rs2: Operand,
}

/// Everything the register file publishes in one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegFileOutputs {
    /// Operand status for the instruction issued in the previous snapshot.
    pub read: Option<OperandRead>,
}

/// Dispatch from the reservation station to the ALU.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AluRequest {
    /// Instruction class.
    pub op: Opcode,
    /// First operand value.
    pub operand1: u32,
    /// Second operand value.
    pub operand2: u32,
    /// Immediate (shift amount for shift-immediates).
    pub imm: u32,
    /// Program counter of the instruction.
    pub pc: u32,
    /// Owning ROB slot.
    pub rob: RobTag,
}

/// Everything the reservation station publishes in one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RsOutputs {
    /// Free slots after this tick's accept and dispatch.
    pub free_slots: usize,
    /// Instruction dispatched to the ALU this tick.
    pub request: Option<AluRequest>,
}

/// Memory request as driven onto the memory port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemRequest {
    /// Request type nibble: bits 0-1 direction, bits 2-3 width class.
    pub kind: u8,
    /// Byte address.
    pub addr: u32,
    /// Store data, already truncated to the access width.
    pub data: u32,
    /// Owning ROB slot.
    pub rob: RobTag,
    /// Sign-extend a narrow read (LB/LH).
    pub sign_extend: bool,
}

/// Everything the load/store queue publishes in one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LsqOutputs {
    /// Free slots after this tick's accept and dispatch.
    pub free_slots: usize,
    /// Request submitted to memory this tick.
    pub request: Option<MemRequest>,
}

/// ALU result broadcast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Completion {
    /// Producing ROB slot.
    pub rob: RobTag,
    /// Result value (link address for jumps, 0 for branches).
    pub value: u32,
    /// Resolved next PC.
    pub next_pc: u32,
}

/// Everything the ALU publishes in one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AluOutputs {
    /// Result computed this tick.
    pub completion: Option<Completion>,
}

/// Memory port status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MemStatus {
    /// Idle; a request may be submitted.
    #[default]
    Free,
    /// A request is in flight.
    Busy,
    /// The request for `rob` completed this tick; `data` is valid.
    DataReady,
}

/// An access that fell outside RAM. It is reported at commit, never earlier,
/// since the access may sit on a path that gets flushed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemFault {
    /// First byte address of the access.
    pub addr: u32,
    /// Access width in bytes.
    pub width: u32,
}

/// Memory `poll()` result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemPoll {
    /// Port status.
    pub status: MemStatus,
    /// ROB slot of the request in flight or just completed.
    pub rob: RobTag,
    /// Load data (0 for stores and faulted accesses).
    pub data: u32,
    /// Set with `DataReady` when the access was out of range.
    pub fault: Option<MemFault>,
}

impl MemPoll {
    /// Result broadcast, if the status is `DataReady`.
    #[inline]
    pub fn ready(self) -> Option<(RobTag, u32)> {
        (self.status == MemStatus::DataReady).then_some((self.rob, self.data))
    }
}

/// Snapshot of all published signals at the start of a tick.
#[derive(Clone, Copy, Debug)]
pub struct Bus<'a> {
    /// Central schedule unit outputs.
    pub csu: CsuOutputs,
    /// Register file outputs.
    pub regfile: RegFileOutputs,
    /// Reservation station outputs.
    pub rs: RsOutputs,
    /// Load/store queue outputs.
    pub lsq: LsqOutputs,
    /// ALU outputs.
    pub alu: AluOutputs,
    /// Memory outputs.
    pub mem: MemPoll,
    /// Committed RAM contents, for the zero-latency instruction fetch and data reads.
    pub ram: &'a Ram,
}

impl Bus<'_> {
    /// Result broadcast by the ALU or memory for `rob` in this snapshot.
    pub fn broadcast_for(&self, rob: RobTag) -> Option<u32> {
        self.alu
            .completion
            .filter(|c| c.rob == rob)
            .map(|c| c.value)
            .or_else(|| self.mem.ready().and_then(|(tag, data)| (tag == rob).then_some(data)))
    }
}
