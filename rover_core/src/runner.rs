//! Drives the control cycle until shutdown.
//!
//! The loop is strictly cooperative: every iteration runs one full
//! sample → decide → output pass (or the stop output) and returns to the
//! top. There is no task queue and nothing here blocks beyond the
//! configured pacing sleep.

use std::sync::atomic::{AtomicBool, Ordering};

use rover_traits::{Drive, Indicator, Panel, RangeSensor};

use crate::Controller;
use crate::error::Result;

/// Run until `shutdown` is raised, then park the motors. Returns the
/// number of iterations driven.
pub fn run<S, D, P, I>(ctl: &mut Controller<S, D, P, I>, shutdown: &AtomicBool) -> Result<u64>
where
    S: RangeSensor,
    D: Drive,
    P: Panel,
    I: Indicator,
{
    tracing::info!("control loop start");
    let mut cycles: u64 = 0;
    while !shutdown.load(Ordering::Relaxed) {
        ctl.step()?;
        cycles = cycles.wrapping_add(1);
    }
    ctl.halt()?;
    tracing::info!(cycles, "control loop stop");
    Ok(cycles)
}

/// Run a fixed number of iterations, then park the motors. Used by the
/// simulated mode and tests.
pub fn run_cycles<S, D, P, I>(ctl: &mut Controller<S, D, P, I>, cycles: u64) -> Result<u64>
where
    S: RangeSensor,
    D: Drive,
    P: Panel,
    I: Indicator,
{
    tracing::info!(cycles, "control loop start (bounded)");
    for _ in 0..cycles {
        ctl.step()?;
    }
    ctl.halt()?;
    tracing::info!(cycles, "control loop stop (bounded)");
    Ok(cycles)
}
