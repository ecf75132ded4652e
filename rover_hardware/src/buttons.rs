//! Falling-edge button watcher for the operator panel.
//!
//! rppal delivers async interrupts on a dedicated thread and clears the
//! pending state before invoking the callback, so each edge arrives here
//! already acknowledged; this module adds the software debounce and then
//! dispatches to the supplied callbacks (one per physical press). The two
//! buttons are independent and may both fire between two loop iterations.

use std::time::{Duration, Instant};

use rppal::gpio::{Gpio, InputPin, Trigger};

use crate::debounce::Debounce;
use crate::error::{HwError, Result};

/// Keeps the interrupt registrations alive; dropping it disarms both
/// buttons.
pub struct ButtonWatcher {
    _stop_pin: InputPin,
    _mode_pin: InputPin,
}

pub fn watch(
    stop_pin: u8,
    mode_pin: u8,
    active_low: bool,
    debounce_ms: u64,
    mut on_stop: impl FnMut() + Send + 'static,
    mut on_mode: impl FnMut() + Send + 'static,
) -> Result<ButtonWatcher> {
    let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
    let trigger = if active_low {
        Trigger::FallingEdge
    } else {
        Trigger::RisingEdge
    };
    let input = |pin: u8| -> Result<InputPin> {
        let pin = gpio.get(pin).map_err(|e| HwError::Gpio(e.to_string()))?;
        Ok(if active_low {
            pin.into_input_pullup()
        } else {
            pin.into_input_pulldown()
        })
    };

    let mut stop = input(stop_pin)?;
    let mut stop_debounce = Debounce::new(Duration::from_millis(debounce_ms));
    stop.set_async_interrupt(trigger, move |_| {
        if stop_debounce.accept(Instant::now()) {
            on_stop();
        }
    })
    .map_err(|e| HwError::Gpio(e.to_string()))?;

    let mut mode = input(mode_pin)?;
    let mut mode_debounce = Debounce::new(Duration::from_millis(debounce_ms));
    mode.set_async_interrupt(trigger, move |_| {
        if mode_debounce.accept(Instant::now()) {
            on_mode();
        }
    })
    .map_err(|e| HwError::Gpio(e.to_string()))?;

    tracing::info!(stop_pin, mode_pin, active_low, debounce_ms, "buttons armed");
    Ok(ButtonWatcher {
        _stop_pin: stop,
        _mode_pin: mode,
    })
}
