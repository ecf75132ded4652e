#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core obstacle-avoidance logic (hardware-agnostic).
//!
//! This crate provides the hardware-independent controller for a
//! two-wheeled differential-drive robot. All hardware interactions go
//! through the `rover_traits` seams (`RangeSensor`, `Drive`, `Panel`,
//! `Indicator`).
//!
//! ## Architecture
//!
//! - **Filtering**: fixed 3-sample window feeding an inverse-distance
//!   calibration (`filter`, `calibration`)
//! - **Steering**: pure decision table over the latest raw pair (`steer`)
//! - **Mode**: atomic stop/threshold flags flipped by button edges (`mode`)
//! - **Cycle**: the cooperative loop body (`Controller::step`) and the
//!   runner loop (`runner`)
//! - **Status**: periodic frame rendering to the panel (`frame`)
//!
//! ## Integer duty arithmetic
//!
//! Duty values are integer carrier counts (`u32`). The decision table's
//! fractional speeds are truncating integer products, so identical inputs
//! always command identical counts.

pub mod calibration;
pub mod config;
pub mod conversions;
pub mod error;
pub mod filter;
pub mod frame;
pub mod hw_error;
pub mod mocks;
pub mod mode;
pub mod runner;
pub mod status;
pub mod steer;
pub mod util;

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use eyre::WrapErr;
use rover_traits::clock::{Clock, MonotonicClock};
use rover_traits::{Drive, DutyPair, Indicator, Panel, RangeSensor};

pub use crate::config::{DisplayCfg, DriveCfg, LoopCfg};
pub use crate::error::{BuildError, ControlError};
pub use crate::filter::{DistancePair, FILTER_WINDOW, SensorFilter};
pub use crate::frame::StatusFrame;
pub use crate::mode::ModeSupervisor;
pub use crate::status::CycleStatus;
pub use crate::steer::{AvoidanceThreshold, DutyClass, Steering, decide};

use crate::error::Result;
use crate::hw_error::map_hw_error;

/// The control cycle: owns the collaborators and all per-cycle state.
///
/// One `step()` is one cooperative pass: stop short-circuit, sample,
/// filter, decide, command, and (on the refresh cadence) reclassify the
/// duty class and push a status frame.
pub struct Controller<S: RangeSensor, D: Drive, P: Panel, I: Indicator> {
    sensor: S,
    drive: D,
    panel: P,
    indicator: I,
    supervisor: Arc<ModeSupervisor>,
    clock: Arc<dyn Clock + Send + Sync>,
    loop_cfg: LoopCfg,
    drive_cfg: DriveCfg,
    display_cfg: DisplayCfg,
    filter: SensorFilter,
    // Latest estimate; stale between filter windows by design.
    distances: DistancePair,
    class: DutyClass,
    // Cached from `class`; the nominal full-speed duty for the steering law.
    max_high: u32,
    last_feedback: u16,
    // Refresh counter for the status-frame cadence.
    ticks: u32,
    // Cached loop period in microseconds to avoid repeated division.
    period_us: u64,
}

impl<S: RangeSensor, D: Drive, P: Panel, I: Indicator> core::fmt::Debug for Controller<S, D, P, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Controller")
            .field("distances", &self.distances)
            .field("class", &self.class)
            .field("stopped", &self.supervisor.stopped())
            .finish()
    }
}

impl<S: RangeSensor, D: Drive, P: Panel, I: Indicator> Controller<S, D, P, I> {
    /// Latest distance estimate (held between filter windows).
    pub fn distances(&self) -> DistancePair {
        self.distances
    }

    /// Currently active duty class.
    pub fn duty_class(&self) -> DutyClass {
        self.class
    }

    /// Shared handle to the mode supervisor (the button-edge target).
    pub fn supervisor(&self) -> Arc<ModeSupervisor> {
        Arc::clone(&self.supervisor)
    }

    /// Configured loop pacing.
    pub fn loop_cfg(&self) -> &LoopCfg {
        &self.loop_cfg
    }

    /// One iteration of the control cycle.
    pub fn step(&mut self) -> Result<CycleStatus> {
        if self.supervisor.stopped() {
            // Idempotent re-issue; the stop edge already commanded this.
            self.drive
                .set_duty(DutyPair::MIN)
                .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
                .wrap_err("stop output")?;
            self.set_indicator(rover_traits::IndicatorState::Stopped);
            frame::render_stopped(&mut self.panel)?;
            self.clock.sleep(Duration::from_micros(self.period_us));
            return Ok(CycleStatus::Stopped);
        }

        // 1) pull one raw sample (synchronous; freshest values win)
        let reading = self
            .sensor
            .sample()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("sampling rangefinders")?;
        self.last_feedback = reading.feedback;

        // 2) feed the filter; a new estimate lands only on full windows
        if let Some(d) = self.filter.accumulate(reading.left, reading.right) {
            self.distances = d;
            tracing::trace!(
                left_cm = d.left_cm,
                right_cm = d.right_cm,
                "distance estimate"
            );
        }

        // 3) decide from the raw pair (not gated on a fresh estimate)
        let decision = steer::decide(
            reading.left,
            reading.right,
            self.supervisor.threshold(),
            self.max_high,
        );
        let bounded = DutyPair::new(
            util::clamp_duty(decision.duty.left, self.drive_cfg.pwm_period),
            util::clamp_duty(decision.duty.right, self.drive_cfg.pwm_period),
        );
        self.drive
            .set_duty(bounded)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("set_duty")?;
        self.set_indicator(decision.indicator);

        // 4) counter-based refresh: reclassify duty and push a frame
        if self.ticks == self.display_cfg.refresh_ticks {
            self.ticks = 0;
            self.class = DutyClass::classify(self.last_feedback);
            self.max_high = self.class.max_high();
            let frame = StatusFrame {
                distances: self.distances,
                threshold: self.supervisor.threshold(),
                class: self.class,
            };
            frame.render(&mut self.panel)?;
            tracing::debug!(
                duty_pct = frame.class.percent(),
                left_cm = frame.distances.left_cm,
                right_cm = frame.distances.right_cm,
                "status frame pushed"
            );
        }
        self.ticks = self.ticks.wrapping_add(1);

        // Throttle the loop to the configured cycle rate.
        self.clock.sleep(Duration::from_micros(self.period_us));
        Ok(CycleStatus::Driving(decision))
    }

    /// Park the motors at minimum duty (best-effort shutdown path).
    pub fn halt(&mut self) -> Result<()> {
        self.drive
            .set_duty(DutyPair::MIN)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("halt")
    }

    // The indicator is fire-and-forget; a failed write must not take the
    // loop down.
    fn set_indicator(&mut self, state: rover_traits::IndicatorState) {
        if let Err(e) = self.indicator.set(state) {
            tracing::warn!(error = %e, "indicator update failed");
        }
    }
}

fn validate_cfg(loop_cfg: &LoopCfg, drive_cfg: &DriveCfg, display_cfg: &DisplayCfg) -> Result<()> {
    if loop_cfg.sample_rate_hz == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "sample_rate_hz must be > 0",
        )));
    }
    if drive_cfg.pwm_period == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "pwm_period must be > 0",
        )));
    }
    if display_cfg.refresh_ticks == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "refresh_ticks must be > 0",
        )));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn assemble<S, D, P, I>(
    sensor: S,
    drive: D,
    panel: P,
    indicator: I,
    supervisor: Arc<ModeSupervisor>,
    loop_cfg: LoopCfg,
    drive_cfg: DriveCfg,
    display_cfg: DisplayCfg,
    clock: Arc<dyn Clock + Send + Sync>,
) -> Controller<S, D, P, I>
where
    S: RangeSensor,
    D: Drive,
    P: Panel,
    I: Indicator,
{
    let period_us = util::period_us(loop_cfg.sample_rate_hz);
    let class = DutyClass::default();
    Controller {
        sensor,
        drive,
        panel,
        indicator,
        supervisor,
        clock,
        loop_cfg,
        drive_cfg,
        display_cfg,
        filter: SensorFilter::new(),
        distances: DistancePair::default(),
        max_high: class.max_high(),
        class,
        last_feedback: 0,
        ticks: 0,
        period_us,
    }
}

/// Build a generic, statically-dispatched controller from concrete
/// collaborators.
#[allow(clippy::too_many_arguments)]
pub fn build_controller<S, D, P, I>(
    sensor: S,
    drive: D,
    panel: P,
    indicator: I,
    supervisor: Arc<ModeSupervisor>,
    loop_cfg: LoopCfg,
    drive_cfg: DriveCfg,
    display_cfg: DisplayCfg,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<Controller<S, D, P, I>>
where
    S: RangeSensor + 'static,
    D: Drive + 'static,
    P: Panel + 'static,
    I: Indicator + 'static,
{
    validate_cfg(&loop_cfg, &drive_cfg, &display_cfg)?;
    let clock: Arc<dyn Clock + Send + Sync> = match clock {
        Some(b) => Arc::from(b),
        None => Arc::new(MonotonicClock::new()),
    };
    Ok(assemble(
        sensor,
        drive,
        panel,
        indicator,
        supervisor,
        loop_cfg,
        drive_cfg,
        display_cfg,
        clock,
    ))
}

// Type-state markers for the builder
pub struct Missing;
pub struct Set;

/// Boxed controller assembled by [`ControllerBuilder`].
pub type BoxedController =
    Controller<Box<dyn RangeSensor>, Box<dyn Drive>, Box<dyn Panel>, Box<dyn Indicator>>;

/// Builder for a boxed [`Controller`]. Sensor and drive advance the
/// type-state; the remaining collaborators are validated on `build()`.
pub struct ControllerBuilder<S, D> {
    sensor: Option<Box<dyn RangeSensor>>,
    drive: Option<Box<dyn Drive>>,
    panel: Option<Box<dyn Panel>>,
    indicator: Option<Box<dyn Indicator>>,
    supervisor: Option<Arc<ModeSupervisor>>,
    loop_cfg: Option<LoopCfg>,
    drive_cfg: Option<DriveCfg>,
    display_cfg: Option<DisplayCfg>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    _s: PhantomData<S>,
    _d: PhantomData<D>,
}

impl ControllerBuilder<Missing, Missing> {
    pub fn new() -> Self {
        Self {
            sensor: None,
            drive: None,
            panel: None,
            indicator: None,
            supervisor: None,
            loop_cfg: None,
            drive_cfg: None,
            display_cfg: None,
            clock: None,
            _s: PhantomData,
            _d: PhantomData,
        }
    }
}

impl Default for ControllerBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

/// Chainable setters that do not affect type-state
impl<S, D> ControllerBuilder<S, D> {
    pub fn with_panel(mut self, panel: impl Panel + 'static) -> Self {
        self.panel = Some(Box::new(panel));
        self
    }
    pub fn with_indicator(mut self, indicator: impl Indicator + 'static) -> Self {
        self.indicator = Some(Box::new(indicator));
        self
    }
    pub fn with_supervisor(mut self, supervisor: Arc<ModeSupervisor>) -> Self {
        self.supervisor = Some(supervisor);
        self
    }
    pub fn with_loop_cfg(mut self, loop_cfg: LoopCfg) -> Self {
        self.loop_cfg = Some(loop_cfg);
        self
    }
    pub fn with_drive_cfg(mut self, drive_cfg: DriveCfg) -> Self {
        self.drive_cfg = Some(drive_cfg);
        self
    }
    pub fn with_display_cfg(mut self, display_cfg: DisplayCfg) -> Self {
        self.display_cfg = Some(display_cfg);
        self
    }
    /// Provide a custom clock; defaults to `MonotonicClock` when absent.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Fallible build available in any type-state; returns a detailed
    /// `BuildError` for each missing piece.
    pub fn try_build(self) -> Result<BoxedController> {
        let ControllerBuilder {
            sensor,
            drive,
            panel,
            indicator,
            supervisor,
            loop_cfg,
            drive_cfg,
            display_cfg,
            clock,
            _s: _,
            _d: _,
        } = self;

        let sensor = sensor.ok_or_else(|| eyre::Report::new(BuildError::MissingSensor))?;
        let drive = drive.ok_or_else(|| eyre::Report::new(BuildError::MissingDrive))?;
        let panel = panel.ok_or_else(|| eyre::Report::new(BuildError::MissingPanel))?;
        let indicator = indicator.ok_or_else(|| eyre::Report::new(BuildError::MissingIndicator))?;

        let supervisor = supervisor.unwrap_or_default();
        let loop_cfg = loop_cfg.unwrap_or_default();
        let drive_cfg = drive_cfg.unwrap_or_default();
        let display_cfg = display_cfg.unwrap_or_default();
        validate_cfg(&loop_cfg, &drive_cfg, &display_cfg)?;
        let clock: Arc<dyn Clock + Send + Sync> = match clock {
            Some(b) => Arc::from(b),
            None => Arc::new(MonotonicClock::new()),
        };

        Ok(assemble(
            sensor,
            drive,
            panel,
            indicator,
            supervisor,
            loop_cfg,
            drive_cfg,
            display_cfg,
            clock,
        ))
    }
}

// Setters that advance type-state when providing mandatory components
impl<D> ControllerBuilder<Missing, D> {
    pub fn with_sensor(self, sensor: impl RangeSensor + 'static) -> ControllerBuilder<Set, D> {
        let ControllerBuilder {
            sensor: _,
            drive,
            panel,
            indicator,
            supervisor,
            loop_cfg,
            drive_cfg,
            display_cfg,
            clock,
            _s: _,
            _d: _,
        } = self;
        ControllerBuilder {
            sensor: Some(Box::new(sensor)),
            drive,
            panel,
            indicator,
            supervisor,
            loop_cfg,
            drive_cfg,
            display_cfg,
            clock,
            _s: PhantomData,
            _d: PhantomData,
        }
    }
}

impl<S> ControllerBuilder<S, Missing> {
    pub fn with_drive(self, drive: impl Drive + 'static) -> ControllerBuilder<S, Set> {
        let ControllerBuilder {
            sensor,
            drive: _,
            panel,
            indicator,
            supervisor,
            loop_cfg,
            drive_cfg,
            display_cfg,
            clock,
            _s: _,
            _d: _,
        } = self;
        ControllerBuilder {
            sensor,
            drive: Some(Box::new(drive)),
            panel,
            indicator,
            supervisor,
            loop_cfg,
            drive_cfg,
            display_cfg,
            clock,
            _s: PhantomData,
            _d: PhantomData,
        }
    }
}

impl ControllerBuilder<Set, Set> {
    /// Validate and build the controller. Only available once the sensor
    /// and drive are set.
    pub fn build(self) -> Result<BoxedController> {
        self.try_build()
    }
}
