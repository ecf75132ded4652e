#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the rover controller.
//!
//! `Config` and sub-structs are deserialized from TOML and validated.
//! Every section has defaults, so the simulated rig runs with no config
//! file at all. The steering thresholds and the distance calibration are
//! deliberately NOT configurable; they live as constants in `rover_core`.

use serde::Deserialize;

/// GPIO / ADC wiring (hardware builds only; ignored by the simulation).
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Pins {
    /// MCP3008 channel for the left rangefinder.
    pub adc_left: u8,
    /// MCP3008 channel for the right rangefinder.
    pub adc_right: u8,
    /// MCP3008 channel for the drive-feedback tap.
    pub adc_feedback: u8,
    /// BCM pin of the emergency-stop button.
    pub button_stop: u8,
    /// BCM pin of the mode-select button.
    pub button_mode: u8,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            adc_left: 0,
            adc_right: 1,
            adc_feedback: 2,
            button_stop: 17,
            button_mode: 27,
        }
    }
}

/// Motor-output settings.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Drive {
    /// PWM carrier period in counts; duty commands are bounded by
    /// `[1, pwm_period]`.
    pub pwm_period: u32,
}

impl Default for Drive {
    fn default() -> Self {
        Self { pwm_period: 40_000 }
    }
}

/// Sampling / loop pacing.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Filter {
    /// Control-cycle rate in Hz.
    pub sample_rate_hz: u32,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            sample_rate_hz: 1_000,
        }
    }
}

/// Status-panel refresh cadence.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Display {
    /// Loop iterations between status frames.
    pub refresh_ticks: u32,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            refresh_ticks: 6_500,
        }
    }
}

/// Operator-button behavior.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Buttons {
    /// Treat low level as pressed when true.
    pub active_low: bool,
    /// Software debounce window in milliseconds.
    pub debounce_ms: u64,
}

impl Default for Buttons {
    fn default() -> Self {
        Self {
            active_low: true,
            debounce_ms: 30,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    /// Path to a .log file (JSON lines); console-only when absent.
    pub file: Option<String>,
    /// "error" | "warn" | "info" | "debug" | "trace"
    pub level: Option<String>,
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    pub drive: Drive,
    pub filter: Filter,
    pub display: Display,
    pub buttons: Buttons,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// Range and consistency checks beyond what serde enforces.
    pub fn validate(&self) -> eyre::Result<()> {
        if self.filter.sample_rate_hz == 0 {
            eyre::bail!("filter.sample_rate_hz must be > 0");
        }
        if self.filter.sample_rate_hz > 1_000_000 {
            eyre::bail!("filter.sample_rate_hz out of range (max 1 MHz)");
        }
        if self.drive.pwm_period == 0 {
            eyre::bail!("drive.pwm_period must be > 0");
        }
        if self.display.refresh_ticks == 0 {
            eyre::bail!("display.refresh_ticks must be > 0");
        }
        let chans = [
            self.pins.adc_left,
            self.pins.adc_right,
            self.pins.adc_feedback,
        ];
        for c in chans {
            if c > 7 {
                eyre::bail!("ADC channel {c} out of range (MCP3008 has channels 0-7)");
            }
        }
        if chans[0] == chans[1] || chans[0] == chans[2] || chans[1] == chans[2] {
            eyre::bail!("ADC channels must be distinct");
        }
        if self.pins.button_stop == self.pins.button_mode {
            eyre::bail!("stop and mode buttons must use distinct pins");
        }
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot:?}");
        }
        Ok(())
    }
}
