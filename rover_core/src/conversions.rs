//! `From` implementations bridging `rover_config` types to `rover_core`
//! types, so the CLI does no field-by-field mapping.

use crate::config::{DisplayCfg, DriveCfg, LoopCfg};

impl From<&rover_config::Filter> for LoopCfg {
    fn from(c: &rover_config::Filter) -> Self {
        Self {
            sample_rate_hz: c.sample_rate_hz,
        }
    }
}

impl From<&rover_config::Drive> for DriveCfg {
    fn from(c: &rover_config::Drive) -> Self {
        Self {
            pwm_period: c.pwm_period,
        }
    }
}

impl From<&rover_config::Display> for DisplayCfg {
    fn from(c: &rover_config::Display) -> Self {
        Self {
            refresh_ticks: c.refresh_ticks,
        }
    }
}
