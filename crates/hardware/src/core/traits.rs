//! Clocked Unit Interface.
//!
//! This module defines the common trait every scheduled unit implements. It provides:
//! 1. **Evaluate:** `work` reads the tick's [`Bus`] snapshot and stages next state.
//! 2. **Commit:** `sync` publishes the staged state and outputs.

use crate::common::error::SimError;
use crate::core::bus::Bus;

/// A unit driven by the two-phase clock.
///
/// `work` must only read the snapshot and the unit's own pre-tick state, and
/// must stage each of its cells at most once. Calling `work` on all units in any
/// order and then `sync` on all units yields the same machine state.
pub trait Unit {
    /// Short name used in logs and trace output.
    fn name(&self) -> &'static str;

    /// Computes this unit's next state from the snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`SimError`] on any protocol fault.
    fn work(&mut self, bus: &Bus<'_>) -> Result<(), SimError>;

    /// Publishes the state staged by `work`.
    fn sync(&mut self);
}
