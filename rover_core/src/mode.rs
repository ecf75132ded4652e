//! Asynchronous mode/stop supervisor.
//!
//! Two independent binary toggles, each owned by one debounced button edge.
//! Both flags are single atomically-readable words: written on the button
//! path (a hardware interrupt thread, or the CLI's operator-panel thread)
//! and read without further synchronization by the control loop. A write
//! may be observed one loop iteration late, never torn; that staleness is
//! tolerated by design, since the loop re-reads both words every pass.
//! `Relaxed` ordering suffices: the flags are independent scalars with no
//! cross-flag ordering requirement.

use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use rover_traits::{Drive, DutyPair};

use crate::error::Result;
use crate::hw_error::map_hw_error;
use crate::steer::AvoidanceThreshold;

#[derive(Debug)]
pub struct ModeSupervisor {
    stopped: AtomicBool,
    threshold_raw: AtomicU16,
}

impl Default for ModeSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeSupervisor {
    /// Startup state: RUNNING, threshold FAR.
    pub fn new() -> Self {
        Self {
            stopped: AtomicBool::new(false),
            threshold_raw: AtomicU16::new(AvoidanceThreshold::Far.raw()),
        }
    }

    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    pub fn threshold(&self) -> AvoidanceThreshold {
        AvoidanceThreshold::from_raw(self.threshold_raw.load(Ordering::Relaxed))
    }

    /// Emergency-stop button edge: flip RUNNING/STOPPED.
    ///
    /// On entering STOPPED the minimum duty pair is commanded here, inside
    /// the handler, not deferred to the next loop iteration; the caller
    /// therefore supplies its own handle onto the drive outputs.
    pub fn on_stop_edge<D: Drive>(&self, drive: &mut D) -> Result<()> {
        let was_stopped = self.stopped.fetch_xor(true, Ordering::Relaxed);
        if was_stopped {
            tracing::info!("emergency stop released");
        } else {
            drive
                .set_duty(DutyPair::MIN)
                .map_err(|e| eyre::Report::new(map_hw_error(&*e)))?;
            tracing::info!("emergency stop engaged");
        }
        Ok(())
    }

    /// Mode-select button edge: flip the avoidance threshold. Takes effect
    /// on the next steering decision.
    pub fn on_mode_edge(&self) {
        let next = self.threshold().toggled();
        self.threshold_raw.store(next.raw(), Ordering::Relaxed);
        tracing::info!(threshold = next.raw(), "avoidance threshold toggled");
    }
}
