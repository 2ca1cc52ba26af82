//! Data Memory Unit.
//!
//! This module implements the single-ported data memory. It provides:
//! 1. **Busy Protocol:** A request accepted while `Free` is performed two ticks
//!    later (`Free -> Busy1 -> Busy2 -> Free`); `DataReady` is published in the
//!    tick the access is performed.
//! 2. **Request Decoding:** The 4-bit request type nibble (direction and width).
//! 3. **Speculative Writes:** Stores modify RAM immediately and leave an undo
//!    record in the [`playback`] log until they commit.
//! 4. **Rollback:** On flush every uncommitted store is undone newest-first.
//!
//! RAM itself lives outside the unit (see [`ram`]); byte writes are staged
//! here and applied by the driver after sync.

/// Speculative write undo log.
pub mod playback;

/// Byte-addressable RAM.
pub mod ram;

use std::collections::BTreeMap;

use tracing::{debug, trace};

use self::playback::{ByteChange, Playback};
use self::ram::Ram;
use crate::common::clocked::Reg;
use crate::common::error::SimError;
use crate::core::bus::{Bus, MemFault, MemPoll, MemRequest, MemStatus, RobTag};
use crate::core::traits::Unit;

/// Mask of the direction bits (0-1) of the request type nibble.
const KIND_DIR_MASK: u8 = 0b0011;
/// Shift of the width class bits (2-3) of the request type nibble.
const KIND_WIDTH_SHIFT: u8 = 2;
/// Mask of the width class bits after shifting.
const KIND_WIDTH_MASK: u8 = 0b0011;

/// Direction of a memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Load.
    Read,
    /// Store.
    Write,
}

/// Builds the request type nibble for an access.
///
/// `width` must be 1, 2 or 4 bytes.
pub const fn encode_kind(dir: Direction, width: u32) -> u8 {
    let d = match dir {
        Direction::Read => 1,
        Direction::Write => 2,
    };
    let w = match width {
        1 => 0,
        2 => 1,
        _ => 2,
    };
    d | (w << KIND_WIDTH_SHIFT)
}

/// Decodes a request type nibble into direction and width in bytes.
///
/// Returns `Ok(None)` for the "no request" direction.
///
/// # Errors
///
/// [`SimError::InvalidRequestType`] for the reserved direction or width class,
/// or any bit set above the nibble.
pub fn decode_kind(kind: u8) -> Result<Option<(Direction, u32)>, SimError> {
    if kind >> 4 != 0 {
        return Err(SimError::InvalidRequestType(kind));
    }
    let dir = match kind & KIND_DIR_MASK {
        0 => return Ok(None),
        1 => Direction::Read,
        2 => Direction::Write,
        _ => return Err(SimError::InvalidRequestType(kind)),
    };
    let width = match (kind >> KIND_WIDTH_SHIFT) & KIND_WIDTH_MASK {
        0 => 1,
        1 => 2,
        2 => 4,
        _ => return Err(SimError::InvalidRequestType(kind)),
    };
    Ok(Some((dir, width)))
}

/// A decoded request held while the port is busy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Access {
    dir: Direction,
    width: u32,
    addr: u32,
    data: u32,
    rob: RobTag,
    sign_extend: bool,
}

impl Access {
    fn decode(req: &MemRequest) -> Result<Option<Self>, SimError> {
        Ok(decode_kind(req.kind)?.map(|(dir, width)| Self {
            dir,
            width,
            addr: req.addr,
            data: req.data,
            rob: req.rob,
            sign_extend: req.sign_extend,
        }))
    }

    fn fault(&self, ram: &Ram) -> Option<MemFault> {
        ram.check_range(self.addr, self.width).is_err().then_some(MemFault {
            addr: self.addr,
            width: self.width,
        })
    }
}

/// Busy state machine of the port.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Port {
    #[default]
    Free,
    Busy1(Access),
    Busy2(Access),
}

#[derive(Clone, Copy, Debug, Default)]
struct MemState {
    port: Port,
    playback: Playback,
}

/// Data memory unit.
#[derive(Debug)]
pub struct Memory {
    state: Reg<MemState>,
    out: Reg<MemPoll>,
    staged: BTreeMap<u32, u8>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    /// Creates an idle memory unit with an empty undo log.
    pub fn new() -> Self {
        Self {
            state: Reg::new(MemState::default()),
            out: Reg::new(MemPoll::default()),
            staged: BTreeMap::new(),
        }
    }

    /// Outputs published at the last sync (the `poll()` result).
    pub fn outputs(&self) -> MemPoll {
        self.out.get()
    }

    /// Whether no request is in flight.
    pub fn is_idle(&self) -> bool {
        self.state.current().port == Port::Free
    }

    /// The undo log as of the last sync.
    pub fn playback(&self) -> &Playback {
        &self.state.current().playback
    }

    /// Removes and returns the RAM writes staged during the last `work`.
    pub fn take_ram_writes(&mut self) -> BTreeMap<u32, u8> {
        std::mem::take(&mut self.staged)
    }

    fn stage(&mut self, addr: u32, value: u8) -> Result<(), SimError> {
        if self.staged.insert(addr, value).is_some() {
            return Err(SimError::DoubleWrite { cell: "ram byte" });
        }
        Ok(())
    }

    /// Performs an in-range access against the committed RAM view.
    fn perform(&mut self, a: &Access, ram: &Ram, playback: &mut Playback) -> Result<u32, SimError> {
        match a.dir {
            Direction::Read => {
                let raw = ram.read(a.addr, a.width)?;
                let value = match (a.width, a.sign_extend) {
                    (1, true) => raw as u8 as i8 as i32 as u32,
                    (2, true) => raw as u16 as i16 as i32 as u32,
                    _ => raw,
                };
                trace!(rob = a.rob.0, addr = a.addr, value, "memory read");
                Ok(value)
            }
            Direction::Write => {
                let mut changes = [ByteChange::default(); 4];
                for i in 0..a.width {
                    let addr = a.addr + i;
                    let before = ram
                        .read_byte(addr)
                        .ok_or(SimError::AddressOutOfRange { addr, width: 1 })?;
                    changes[i as usize] = ByteChange { addr, before };
                    self.stage(addr, (a.data >> (8 * i)) as u8)?;
                }
                playback.record(a.rob, &changes[..a.width as usize]);
                trace!(rob = a.rob.0, addr = a.addr, data = a.data, "memory write");
                Ok(0)
            }
        }
    }
}

impl Unit for Memory {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn work(&mut self, bus: &Bus<'_>) -> Result<(), SimError> {
        let mut st = self.state.get();

        if let Some(c) = bus.csu.commit {
            st.playback.commit(c.rob);
        }

        if bus.csu.flush {
            let restore = st.playback.undo_all();
            if !restore.is_empty() {
                debug!(bytes = restore.len(), "rolling back uncommitted stores");
            }
            for (addr, value) in restore {
                self.stage(addr, value)?;
            }
            st.port = Port::Free;
            self.state.set(st)?;
            return self.out.set(MemPoll::default());
        }

        let incoming = match bus.lsq.request {
            Some(req) => Access::decode(&req)?,
            None => None,
        };

        let port = st.port;
        let poll = match port {
            Port::Free => incoming.map_or_else(MemPoll::default, |a| {
                st.port = Port::Busy1(a);
                MemPoll {
                    status: MemStatus::Busy,
                    rob: a.rob,
                    ..MemPoll::default()
                }
            }),
            Port::Busy1(a) | Port::Busy2(a) => {
                if let Some(rejected) = incoming {
                    return Err(SimError::MemoryBusy { rob: rejected.rob });
                }
                if matches!(port, Port::Busy1(_)) {
                    st.port = Port::Busy2(a);
                    MemPoll {
                        status: MemStatus::Busy,
                        rob: a.rob,
                        ..MemPoll::default()
                    }
                } else {
                    st.port = Port::Free;
                    // An out-of-range access completes without touching RAM.
                    let fault = a.fault(bus.ram);
                    let data = match fault {
                        Some(_) => {
                            debug!(
                                rob = a.rob.0,
                                addr = a.addr,
                                width = a.width,
                                "access out of range"
                            );
                            0
                        }
                        None => self.perform(&a, bus.ram, &mut st.playback)?,
                    };
                    MemPoll {
                        status: MemStatus::DataReady,
                        rob: a.rob,
                        data,
                        fault,
                    }
                }
            }
        };

        self.state.set(st)?;
        self.out.set(poll)
    }

    fn sync(&mut self) {
        self.state.sync();
        self.out.sync();
    }
}
