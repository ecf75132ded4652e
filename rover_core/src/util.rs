//! Loop-pacing and duty-bound helpers for rover_core.

use crate::steer::MIN_DUTY;

/// Number of microseconds in one second.
pub const MICROS_PER_SEC: u64 = 1_000_000;
/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: u64 = 1_000;

/// Compute the period in microseconds for a given cycle rate in Hz.
/// - Clamps `hz` to at least 1 to avoid division by zero.
/// - Ensures result is at least 1 microsecond.
#[inline]
pub fn period_us(hz: u32) -> u64 {
    (MICROS_PER_SEC / u64::from(hz.max(1))).max(1)
}

/// Compute the period in milliseconds for a given cycle rate in Hz.
#[inline]
pub fn period_ms(hz: u32) -> u64 {
    (MILLIS_PER_SEC / u64::from(hz.max(1))).max(1)
}

/// Bound a commanded duty to the valid `[MIN_DUTY, period]` range.
/// The steering law can bias a channel past the carrier period
/// (`max_high + trim` at the full duty class); the bound is enforced once
/// here, at the output boundary, so the decision table stays untouched.
#[inline]
pub fn clamp_duty(value: u32, period: u32) -> u32 {
    value.clamp(MIN_DUTY, period.max(MIN_DUTY))
}
