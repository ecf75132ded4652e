//! Maps `Box<dyn Error>` from trait boundaries to typed `ControlError`.
//!
//! The traits in `rover_traits` use `Box<dyn Error + Send + Sync>` for
//! maximum flexibility; this module converts those to our typed error enum,
//! with an optional feature-gated path for `rover_hardware::HwError`
//! downcasting.

use crate::error::ControlError;

/// Map a trait-boundary error to a typed `ControlError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to a string-carrying variant.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> ControlError {
    // Feature-gated: try to downcast to HwError for precise mapping
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<rover_hardware::error::HwError>() {
            return ControlError::HardwareFault(hw.to_string());
        }
    }

    ControlError::Hardware(e.to_string())
}
