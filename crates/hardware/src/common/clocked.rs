//! Clocked storage cell.
//!
//! Every piece of unit state lives in a [`Reg`]. A tick has two phases:
//! 1. **Evaluate:** units read the pre-tick value with [`Reg::get`] and stage at
//!    most one new value with [`Reg::set`].
//! 2. **Sync:** the driver calls [`Reg::sync`], which publishes the staged value.
//!
//! A second `set` before `sync` is a scheduling bug and is reported as
//! [`SimError::DoubleWrite`].

use crate::common::error::SimError;

/// A register-like cell with write-at-most-once-per-tick semantics.
#[derive(Clone, Debug, Default)]
pub struct Reg<T> {
    cur: T,
    next: T,
    written: bool,
}

impl<T: Clone> Reg<T> {
    /// Creates a cell holding `value` in both the current and staged slot.
    pub fn new(value: T) -> Self {
        Self {
            cur: value.clone(),
            next: value,
            written: false,
        }
    }

    /// Returns the value published at the last sync.
    #[inline]
    pub fn get(&self) -> T {
        self.cur.clone()
    }

    /// Borrows the value published at the last sync.
    #[inline]
    pub const fn current(&self) -> &T {
        &self.cur
    }

    /// Stages `value` to become visible after the next sync.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DoubleWrite`] if the cell was already written this tick.
    #[inline]
    pub fn set(&mut self, value: T) -> Result<(), SimError> {
        if self.written {
            return Err(SimError::DoubleWrite {
                cell: std::any::type_name::<T>(),
            });
        }
        self.written = true;
        self.next = value;
        Ok(())
    }

    /// Whether the cell has been written since the last sync.
    #[inline]
    pub const fn is_written(&self) -> bool {
        self.written
    }

    /// Publishes the staged value (if any) and re-arms the write guard.
    #[inline]
    pub fn sync(&mut self) {
        if self.written {
            self.cur = self.next.clone();
            self.written = false;
        }
    }
}
