//! Speculative write undo log.
//!
//! Stores reach RAM before they commit. Each one records the bytes it
//! overwrote in the playback slot of its ROB index, stamped with a monotonic
//! write counter. Commit discards the record; flush replays every live record
//! newest-first so each byte ends up holding the value it had before the oldest
//! uncommitted write touched it.

use std::collections::BTreeMap;

use crate::common::constants::{MAX_ACCESS_BYTES, ROB_SIZE};
use crate::core::bus::RobTag;

/// One overwritten byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ByteChange {
    /// Byte address.
    pub addr: u32,
    /// Value before the write.
    pub before: u8,
}

/// Undo record of a single uncommitted store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackRecord {
    /// Whether the store is still uncommitted.
    pub live: bool,
    /// Write order among all stores.
    pub stamp: u64,
    changes: [ByteChange; MAX_ACCESS_BYTES],
    len: usize,
}

impl PlaybackRecord {
    /// The recorded byte changes.
    pub fn changes(&self) -> &[ByteChange] {
        &self.changes[..self.len]
    }
}

/// Undo records indexed by ROB slot, plus the write clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Playback {
    records: [PlaybackRecord; ROB_SIZE],
    clock: u64,
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            records: [PlaybackRecord::default(); ROB_SIZE],
            clock: 0,
        }
    }
}

impl Playback {
    /// Records the pre-write values of a store owned by `rob`.
    pub fn record(&mut self, rob: RobTag, changes: &[ByteChange]) {
        let mut rec = PlaybackRecord {
            live: true,
            stamp: self.clock,
            ..PlaybackRecord::default()
        };
        for (dst, src) in rec.changes.iter_mut().zip(changes) {
            *dst = *src;
            rec.len += 1;
        }
        self.records[rob.slot()] = rec;
        self.clock += 1;
    }

    /// Discards the record of a committed instruction.
    pub fn commit(&mut self, rob: RobTag) {
        self.records[rob.slot()].live = false;
    }

    /// Number of live (uncommitted) records.
    pub fn live_count(&self) -> usize {
        self.records.iter().filter(|r| r.live).count()
    }

    /// Record of `rob`, if live.
    pub fn get(&self, rob: RobTag) -> Option<&PlaybackRecord> {
        Some(&self.records[rob.slot()]).filter(|r| r.live)
    }

    /// Drops every live record and returns the byte values that restore RAM.
    ///
    /// Records are replayed in reverse stamp order and collapsed per byte, so
    /// the returned map holds each touched byte's oldest before-value.
    pub fn undo_all(&mut self) -> BTreeMap<u32, u8> {
        let mut live: Vec<PlaybackRecord> = self.records.iter().copied().filter(|r| r.live).collect();
        live.sort_unstable_by(|a, b| b.stamp.cmp(&a.stamp));

        let mut restore = BTreeMap::new();
        for rec in &live {
            for change in rec.changes() {
                let _ = restore.insert(change.addr, change.before);
            }
        }
        for rec in &mut self.records {
            rec.live = false;
        }
        restore
    }
}
