//! MCP3008 SPI front-end for the rangefinders and the drive-feedback tap.
//!
//! The MCP3008 is a 10-bit converter; counts are scaled up to the 12-bit
//! range the distance calibration expects before they leave this module.

use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

use rover_traits::{RangeSensor, Reading};

use crate::error::{HwError, Result};

const SPI_CLOCK_HZ: u32 = 1_350_000;

pub struct Mcp3008Frontend {
    spi: Spi,
    left_ch: u8,
    right_ch: u8,
    feedback_ch: u8,
}

impl Mcp3008Frontend {
    pub fn new(left_ch: u8, right_ch: u8, feedback_ch: u8) -> Result<Self> {
        for ch in [left_ch, right_ch, feedback_ch] {
            if ch > 7 {
                return Err(HwError::Spi(format!("MCP3008 channel {ch} out of range")));
            }
        }
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, SPI_CLOCK_HZ, Mode::Mode0)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        Ok(Self {
            spi,
            left_ch,
            right_ch,
            feedback_ch,
        })
    }

    fn read_channel(&mut self, ch: u8) -> Result<u16> {
        // Start bit, single-ended mode + channel, one clocking byte.
        let tx = [1u8, (0x08 | ch) << 4, 0];
        let mut rx = [0u8; 3];
        self.spi
            .transfer(&mut rx, &tx)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        let counts = (u16::from(rx[1] & 0x03) << 8) | u16::from(rx[2]);
        // 10-bit counts, scaled to the 12-bit range the calibration expects.
        Ok(counts << 2)
    }
}

impl RangeSensor for Mcp3008Frontend {
    fn sample(&mut self) -> std::result::Result<Reading, Box<dyn std::error::Error + Send + Sync>> {
        let left = self.read_channel(self.left_ch)?;
        let right = self.read_channel(self.right_ch)?;
        let feedback = self.read_channel(self.feedback_ch)?;
        tracing::trace!(left, right, feedback, "adc sample");
        Ok(Reading {
            left,
            right,
            feedback,
        })
    }
}
