//! Per-iteration status of the control cycle.

use crate::steer::Steering;

/// Outcome of a single control-cycle iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    /// Stop mode: minimum duty held, steering skipped.
    Stopped,
    /// Normal pass; carries the decision that was commanded.
    Driving(Steering),
}
