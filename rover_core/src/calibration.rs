//! Raw-intensity to distance conversion for the rangefinders.
//!
//! The curve is an inverse fit (distance proportional to
//! `1 / (voltage - offset)`) to the rangefinder's datasheet response. The
//! coefficients are fixed; apparent asymmetries between channels are a
//! property of the fit, not a bug, so both sides share the one curve and
//! nothing here is re-derived at runtime.

/// ADC reference voltage, volts.
const VREF: f32 = 3.3;
/// ADC full-scale count.
const ADC_FULL_SCALE: f32 = 4095.0;
/// Numerator gain of the inverse fit, centimeter-volts.
const CURVE_GAIN: f32 = 24.28;
/// Voltage offset of the inverse fit.
const CURVE_OFFSET: f32 = 2.867;
/// Upper bound of the usable range, centimeters.
pub const DISTANCE_CAP_CM: u16 = 70;

/// Convert an averaged raw intensity to centimeters.
///
/// The fit is only valid over part of the input range; outside it the
/// result saturates into `[0, DISTANCE_CAP_CM]` instead of going negative
/// or unbounded. Callers must treat the clamp as authoritative.
pub fn distance_cm(avg_raw: f32) -> u16 {
    let volts = avg_raw * VREF / ADC_FULL_SCALE;
    let d = CURVE_GAIN / (volts - CURVE_OFFSET + 0.1 * CURVE_GAIN);
    if !d.is_finite() {
        return DISTANCE_CAP_CM;
    }
    d.clamp(0.0, f32::from(DISTANCE_CAP_CM)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mid_range_reading_lands_in_band() {
        // Around the FAR threshold the curve reads roughly 20 cm.
        let d = distance_cm(2000.0);
        assert!((18..=24).contains(&d), "got {d}");
    }

    #[test]
    fn near_threshold_reading_is_farther() {
        let d = distance_cm(1500.0);
        assert!((28..=35).contains(&d), "got {d}");
    }

    #[test]
    fn weak_signal_saturates_at_cap() {
        // Below the fit's valid range the denominator collapses; the cap
        // must hold, never an overflow.
        assert_eq!(distance_cm(600.0), DISTANCE_CAP_CM);
        assert_eq!(distance_cm(560.0), DISTANCE_CAP_CM);
    }

    #[test]
    fn negative_fit_saturates_at_zero() {
        // Far enough below the valid range the fit goes negative.
        assert_eq!(distance_cm(100.0), 0);
        assert_eq!(distance_cm(0.0), 0);
    }

    #[test]
    fn strong_signal_reads_close() {
        let d = distance_cm(4095.0);
        assert!(d < 15, "got {d}");
    }
}
