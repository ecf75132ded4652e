//! Hardware backends and the simulated rig.
//!
//! The simulated implementations are the default; they are also what the
//! integration tests drive. Real Raspberry Pi backends (MCP3008 ADC,
//! hardware PWM, GPIO buttons) live behind the `hardware` feature.
//!
//! Every simulated output is a cloneable handle onto shared state: the
//! emergency-stop edge handler commands the motors from the button thread,
//! so it needs its own handle, exactly as the real PWM peripheral can be
//! addressed from any thread.

pub mod debounce;
pub mod error;

#[cfg(feature = "hardware")]
pub mod buttons;
#[cfg(feature = "hardware")]
pub mod mcp3008;
#[cfg(feature = "hardware")]
pub mod pwm;

use std::sync::{Arc, Mutex};

use rover_traits::{Drive, DutyPair, Indicator, IndicatorState, Panel, RangeSensor, Reading};

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Scripted range sensor: replays a fixed sequence of readings, then
/// repeats the last one (an empty script reads all-zero).
pub struct SimulatedRangeSensor {
    seq: Vec<Reading>,
    idx: usize,
}

impl SimulatedRangeSensor {
    pub fn new(seq: impl Into<Vec<Reading>>) -> Self {
        Self {
            seq: seq.into(),
            idx: 0,
        }
    }

    /// A static scene: constant returns on both sides, feedback pinned in
    /// the 50%-duty band.
    pub fn steady(left: u16, right: u16) -> Self {
        Self::new([Reading {
            left,
            right,
            feedback: 2000,
        }])
    }
}

impl RangeSensor for SimulatedRangeSensor {
    fn sample(&mut self) -> Result<Reading, BoxedError> {
        let r = if self.idx < self.seq.len() {
            let r = self.seq[self.idx];
            self.idx += 1;
            r
        } else {
            self.seq.last().copied().unwrap_or_default()
        };
        Ok(r)
    }
}

/// Shared state behind the simulated drive handles.
#[derive(Debug, Default)]
pub struct DriveState {
    pub last: Option<DutyPair>,
    pub history: Vec<DutyPair>,
}

/// Simulated motor outputs. Cloning yields another handle onto the same
/// channel state.
#[derive(Debug, Clone, Default)]
pub struct SimulatedDrive {
    state: Arc<Mutex<DriveState>>,
}

impl SimulatedDrive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last commanded duty pair, if any.
    pub fn last(&self) -> Option<DutyPair> {
        self.state.lock().ok().and_then(|st| st.last)
    }

    /// Every duty pair commanded so far, oldest first.
    pub fn history(&self) -> Vec<DutyPair> {
        self.state
            .lock()
            .map(|st| st.history.clone())
            .unwrap_or_default()
    }
}

impl Drive for SimulatedDrive {
    fn set_duty(&mut self, duty: DutyPair) -> Result<(), BoxedError> {
        if let Ok(mut st) = self.state.lock() {
            st.last = Some(duty);
            st.history.push(duty);
        }
        tracing::trace!(left = duty.left, right = duty.right, "sim duty");
        Ok(())
    }
}

#[derive(Debug, Default)]
struct PanelState {
    rows: Vec<String>,
    cursor_row: usize,
    clears: u32,
}

/// Recording status panel. Tracks the cursor row only; writes append to
/// the addressed row, which is enough to assert on rendered frames.
#[derive(Debug, Clone, Default)]
pub struct SimulatedPanel {
    state: Arc<Mutex<PanelState>>,
}

impl SimulatedPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current panel contents, rows joined with newlines.
    pub fn text(&self) -> String {
        self.state
            .lock()
            .map(|st| st.rows.join("\n"))
            .unwrap_or_default()
    }

    /// Number of clear() calls observed.
    pub fn clears(&self) -> u32 {
        self.state.lock().map(|st| st.clears).unwrap_or(0)
    }

    fn append(&self, text: &str) {
        if let Ok(mut st) = self.state.lock() {
            let row = st.cursor_row;
            if st.rows.len() <= row {
                st.rows.resize(row + 1, String::new());
            }
            st.rows[row].push_str(text);
        }
    }
}

impl Panel for SimulatedPanel {
    fn clear(&mut self) -> Result<(), BoxedError> {
        if let Ok(mut st) = self.state.lock() {
            st.rows.clear();
            st.cursor_row = 0;
            st.clears += 1;
        }
        Ok(())
    }

    fn set_cursor(&mut self, _col: u8, row: u8) -> Result<(), BoxedError> {
        if let Ok(mut st) = self.state.lock() {
            st.cursor_row = usize::from(row);
        }
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), BoxedError> {
        self.append(text);
        Ok(())
    }

    fn write_unsigned(&mut self, n: u32) -> Result<(), BoxedError> {
        self.append(&n.to_string());
        Ok(())
    }
}

/// Panel that renders rows into the tracing log; the headless rig's
/// stand-in for a character LCD. Rows are flushed on cursor moves and on
/// clear, so one log line corresponds to one rendered row.
#[derive(Debug, Default)]
pub struct LogPanel {
    row: String,
}

impl LogPanel {
    pub fn new() -> Self {
        Self::default()
    }

    fn flush(&mut self) {
        if !self.row.is_empty() {
            tracing::info!(row = %self.row, "panel");
            self.row.clear();
        }
    }
}

impl Panel for LogPanel {
    fn clear(&mut self) -> Result<(), BoxedError> {
        self.flush();
        tracing::info!("panel cleared");
        Ok(())
    }

    fn set_cursor(&mut self, _col: u8, _row: u8) -> Result<(), BoxedError> {
        self.flush();
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), BoxedError> {
        self.row.push_str(text);
        Ok(())
    }

    fn write_unsigned(&mut self, n: u32) -> Result<(), BoxedError> {
        self.row.push_str(&n.to_string());
        Ok(())
    }
}

/// Indicator that mirrors its state into the tracing log.
#[derive(Debug, Default)]
pub struct LogIndicator {
    last: Option<IndicatorState>,
}

impl LogIndicator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Indicator for LogIndicator {
    fn set(&mut self, state: IndicatorState) -> Result<(), BoxedError> {
        // Only log transitions; the loop re-asserts the state every pass.
        if self.last != Some(state) {
            tracing::info!(?state, "indicator");
            self.last = Some(state);
        }
        Ok(())
    }
}

/// Recording indicator.
#[derive(Debug, Clone, Default)]
pub struct SimulatedIndicator {
    states: Arc<Mutex<Vec<IndicatorState>>>,
}

impl SimulatedIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<IndicatorState> {
        self.states.lock().ok().and_then(|v| v.last().copied())
    }

    pub fn history(&self) -> Vec<IndicatorState> {
        self.states.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Indicator for SimulatedIndicator {
    fn set(&mut self, state: IndicatorState) -> Result<(), BoxedError> {
        if let Ok(mut v) = self.states.lock() {
            v.push(state);
        }
        Ok(())
    }
}
