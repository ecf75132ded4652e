//! Periodic status frame pushed to the operator panel.

use rover_traits::Panel;

use crate::error::Result;
use crate::filter::DistancePair;
use crate::hw_error::map_hw_error;
use crate::steer::{AvoidanceThreshold, DutyClass};

fn panel_err(e: Box<dyn std::error::Error + Send + Sync>) -> eyre::Report {
    eyre::Report::new(map_hw_error(&*e))
}

/// One status frame: latest distance estimates, active avoidance mode, and
/// the current duty class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFrame {
    pub distances: DistancePair,
    pub threshold: AvoidanceThreshold,
    pub class: DutyClass,
}

impl StatusFrame {
    /// Render the frame: rows 0/1 carry the right/left distances, row 2
    /// the avoidance mode, row 4 the duty percentage.
    pub fn render<P: Panel>(&self, panel: &mut P) -> Result<()> {
        panel.set_cursor(0, 0).map_err(panel_err)?;
        panel.write_text("R:").map_err(panel_err)?;
        panel
            .write_unsigned(u32::from(self.distances.right_cm))
            .map_err(panel_err)?;
        panel.write_text("cm").map_err(panel_err)?;

        panel.set_cursor(0, 1).map_err(panel_err)?;
        panel.write_text("L:").map_err(panel_err)?;
        panel
            .write_unsigned(u32::from(self.distances.left_cm))
            .map_err(panel_err)?;
        panel.write_text("cm").map_err(panel_err)?;

        panel.set_cursor(0, 2).map_err(panel_err)?;
        panel.write_text("avoid: ").map_err(panel_err)?;
        panel.write_text(self.threshold.label()).map_err(panel_err)?;

        panel.set_cursor(0, 4).map_err(panel_err)?;
        panel.write_text("Duty: ").map_err(panel_err)?;
        panel
            .write_unsigned(self.class.percent())
            .map_err(panel_err)?;
        panel.write_text("%").map_err(panel_err)?;

        Ok(())
    }
}

/// Stop-mode rendering: wipe the frame and show the stop tag. Re-rendered
/// every stopped iteration.
pub fn render_stopped<P: Panel>(panel: &mut P) -> Result<()> {
    panel.clear().map_err(panel_err)?;
    panel.write_text("E-stop").map_err(panel_err)?;
    Ok(())
}
