//! Source operand capture.
//!
//! Reservation station and LSQ slots hold each source operand in one of three
//! states. A slot accepted in tick `t+1` (the tick after issue) starts with both
//! operands [`Operand::Pending`]; in tick `t+2` they are resolved from the
//! register file answer, the CSU backfill, or that tick's broadcasts, and
//! whatever remains waits on its producer's broadcast.

use crate::core::bus::{Bus, OperandRead, RobTag};

/// State of one source operand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Operand {
    /// Accepted last tick; the register file answer has not arrived yet.
    #[default]
    Pending,
    /// Waiting for the broadcast of an in-flight producer.
    Waiting(RobTag),
    /// Captured value.
    Value(u32),
}

impl Operand {
    /// Captured value, if any.
    #[inline]
    pub const fn value(self) -> Option<u32> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Whether the value has been captured.
    #[inline]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Captures the value if its producer broadcasts in this snapshot.
    pub fn snoop(&mut self, bus: &Bus<'_>) {
        if let Self::Waiting(producer) = *self {
            if let Some(v) = bus.broadcast_for(producer) {
                *self = Self::Value(v);
            }
        }
    }

    /// Resolves a pending operand from the register file answer, the
    /// ROB backfill and the current broadcasts, in that order.
    pub fn resolve(read: Self, forwarded: Option<u32>, bus: &Bus<'_>) -> Self {
        let mut resolved = match (read, forwarded) {
            (Self::Value(v), _) | (_, Some(v)) => Self::Value(v),
            (other, None) => other,
        };
        resolved.snoop(bus);
        resolved
    }
}

/// Resolves both pending operands of the slot owned by `rob`.
///
/// Returns `None` if the register file answer in the snapshot is for another
/// instruction, which the caller reports as an inconsistency.
pub fn resolve_pair(rob: RobTag, bus: &Bus<'_>) -> Option<(Operand, Operand)> {
    let OperandRead { rob: read_rob, rs1, rs2 } = bus.regfile.read?;
    if read_rob != rob {
        return None;
    }
    let fwd = bus.csu.forward.filter(|f| f.rob == rob);
    Some((
        Operand::resolve(rs1, fwd.and_then(|f| f.rs1), bus),
        Operand::resolve(rs2, fwd.and_then(|f| f.rs2), bus),
    ))
}
