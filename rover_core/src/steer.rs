//! Steering decision engine: a pure mapping from the latest raw readings
//! to a duty-cycle pair and an indicator state.
//!
//! Sensor convention: a higher raw reading means a closer obstacle, so the
//! engine steers away from the side reporting the larger value.

use rover_traits::{DutyPair, IndicatorState};

/// Raw readings at or below this floor carry no usable return signal.
pub const NO_SIGNAL_FLOOR: u16 = 900;
/// Raw reading at or above this cutoff triggers the amplified turn.
pub const SHARP_TURN_CUTOFF: u16 = 3300;
/// Symmetry-breaking duty bias applied while no obstacle is in range.
pub const TRIM_BIAS: u32 = 500;
/// Minimum non-zero duty; the effectively-off command.
pub const MIN_DUTY: u32 = 1;

/// Raw-intensity threshold above which an obstacle is close enough to
/// react to. `Far` is the startup mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvoidanceThreshold {
    /// React late, at roughly 20 cm (raw 1900).
    Far,
    /// React early, at roughly 30 cm (raw 1500).
    Near,
}

impl AvoidanceThreshold {
    /// Threshold value in raw-sample units.
    pub const fn raw(self) -> u16 {
        match self {
            Self::Near => 1500,
            Self::Far => 1900,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Near => Self::Far,
            Self::Far => Self::Near,
        }
    }

    /// Decode the raw word stored by the mode supervisor; anything that is
    /// not the NEAR value reads as FAR.
    pub const fn from_raw(raw: u16) -> Self {
        if raw == Self::Near.raw() {
            Self::Near
        } else {
            Self::Far
        }
    }

    /// Reaction distance shown on the status panel.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Near => "30cm",
            Self::Far => "20cm",
        }
    }
}

/// Nominal full-speed duty class, reselected periodically from the
/// drive-feedback channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DutyClass {
    Low,
    #[default]
    Half,
    Full,
}

impl DutyClass {
    /// Classify the drive-feedback proxy. The 2301..=2699 band falls
    /// through to `Low`; the gap is part of the heuristic.
    pub fn classify(feedback: u16) -> Self {
        if feedback >= 2700 {
            Self::Full
        } else if (1400..=2300).contains(&feedback) {
            Self::Half
        } else {
            Self::Low
        }
    }

    /// Nominal full-speed duty used by the steering law.
    pub const fn max_high(self) -> u32 {
        match self {
            Self::Full => 40_000,
            Self::Half => 20_000,
            Self::Low => 18_000,
        }
    }

    /// Duty percentage shown on the status panel.
    pub const fn percent(self) -> u32 {
        match self {
            Self::Full => 100,
            Self::Half => 50,
            Self::Low => 35,
        }
    }
}

/// One steering decision: the duty pair to command and the indicator state
/// that mirrors it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Steering {
    pub duty: DutyPair,
    pub indicator: IndicatorState,
}

/// Decide the duty pair for the latest raw readings.
///
/// Branches are evaluated top to bottom, first match wins. The comparison
/// operators and tie-breaks are load-bearing: an equal pair below the
/// active threshold always takes the left-biased trim so a dead-even scene
/// cannot oscillate, and both sides at or below the no-signal floor read
/// as "nothing detected reliably" and stop the motors rather than running
/// open-throttle on a dead sensor.
pub fn decide(
    raw_left: u16,
    raw_right: u16,
    threshold: AvoidanceThreshold,
    max_high: u32,
) -> Steering {
    if raw_left <= NO_SIGNAL_FLOOR && raw_right <= NO_SIGNAL_FLOOR {
        return Steering {
            duty: DutyPair::MIN,
            indicator: IndicatorState::Stopped,
        };
    }

    let thr = threshold.raw();
    if raw_left >= thr || raw_right >= thr {
        if raw_right > raw_left {
            // Obstacle on the right: swing left, hard above the cutoff.
            let duty = if raw_right >= SHARP_TURN_CUTOFF {
                DutyPair::new(MIN_DUTY, max_high)
            } else {
                DutyPair::new(max_high / 4, max_high * 3 / 4)
            };
            Steering {
                duty,
                indicator: IndicatorState::Left,
            }
        } else {
            // Obstacle on the left, or both sides tied above threshold.
            let duty = if raw_left >= SHARP_TURN_CUTOFF {
                DutyPair::new(max_high, MIN_DUTY)
            } else {
                DutyPair::new(max_high * 3 / 4, max_high / 4)
            };
            Steering {
                duty,
                indicator: IndicatorState::Right,
            }
        }
    } else if raw_left > raw_right {
        Steering {
            duty: DutyPair::new(max_high + TRIM_BIAS, max_high),
            indicator: IndicatorState::Idle,
        }
    } else {
        Steering {
            duty: DutyPair::new(max_high, max_high + TRIM_BIAS),
            indicator: IndicatorState::Idle,
        }
    }
}
