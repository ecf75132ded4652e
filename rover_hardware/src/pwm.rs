//! Dual hardware-PWM drive on the Raspberry Pi's two PWM channels.
//!
//! Duty arrives as carrier counts in `[1, period]` and is converted to the
//! fractional duty cycle rppal wants. The handle is cloneable so the
//! emergency-stop edge can command the motors from the button thread.

use std::sync::{Arc, Mutex};

use rppal::pwm::{Channel, Polarity, Pwm};

use rover_traits::{Drive, DutyPair};

use crate::error::{HwError, Result};

const PWM_FREQUENCY_HZ: f64 = 1_000.0;

struct PwmPair {
    left: Pwm,
    right: Pwm,
}

#[derive(Clone)]
pub struct HardwareDrive {
    inner: Arc<Mutex<PwmPair>>,
    period: u32,
}

impl HardwareDrive {
    pub fn new(period: u32) -> Result<Self> {
        let left = Pwm::with_frequency(Channel::Pwm0, PWM_FREQUENCY_HZ, 0.0, Polarity::Normal, true)
            .map_err(|e| HwError::Pwm(e.to_string()))?;
        let right =
            Pwm::with_frequency(Channel::Pwm1, PWM_FREQUENCY_HZ, 0.0, Polarity::Normal, true)
                .map_err(|e| HwError::Pwm(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(Mutex::new(PwmPair { left, right })),
            period: period.max(1),
        })
    }

    fn fraction(&self, counts: u32) -> f64 {
        f64::from(counts.min(self.period)) / f64::from(self.period)
    }
}

impl Drive for HardwareDrive {
    fn set_duty(
        &mut self,
        duty: DutyPair,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let left = self.fraction(duty.left);
        let right = self.fraction(duty.right);
        let pair = self
            .inner
            .lock()
            .map_err(|_| HwError::Pwm("pwm handle poisoned".into()))?;
        pair.left
            .set_duty_cycle(left)
            .map_err(|e| HwError::Pwm(e.to_string()))?;
        pair.right
            .set_duty_cycle(right)
            .map_err(|e| HwError::Pwm(e.to_string()))?;
        tracing::trace!(left = duty.left, right = duty.right, "pwm duty");
        Ok(())
    }
}
