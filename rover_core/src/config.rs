//! Runtime configuration for the controller.
//!
//! These are the structs consumed by `Controller`; they are separate from
//! the TOML-deserialized schema in `rover_config`.

/// Loop pacing configuration.
#[derive(Debug, Clone)]
pub struct LoopCfg {
    /// Control-cycle rate in Hz; drives the per-iteration sleep.
    pub sample_rate_hz: u32,
}

impl Default for LoopCfg {
    fn default() -> Self {
        Self {
            sample_rate_hz: 1_000,
        }
    }
}

/// Motor-output configuration.
#[derive(Debug, Clone)]
pub struct DriveCfg {
    /// PWM carrier period in counts; commanded duty is bounded by
    /// `[1, pwm_period]`.
    pub pwm_period: u32,
}

impl Default for DriveCfg {
    fn default() -> Self {
        Self { pwm_period: 40_000 }
    }
}

/// Status-panel refresh cadence.
#[derive(Debug, Clone)]
pub struct DisplayCfg {
    /// Loop iterations between status frames (a coarse counter period,
    /// not wall-clock time).
    pub refresh_ticks: u32,
}

impl Default for DisplayCfg {
    fn default() -> Self {
        Self {
            refresh_ticks: 6_500,
        }
    }
}
