use std::error::Error;
use std::sync::{Arc, Mutex};

use rover_core::error::BuildError;
use rover_core::mocks::NoopSensor;
use rover_core::{
    ControllerBuilder, CycleStatus, DisplayCfg, DriveCfg, LoopCfg, ModeSupervisor, runner,
};
use rover_traits::{
    Drive, DutyPair, Indicator, IndicatorState, Panel, RangeSensor, Reading,
};

/// Scripted sensor: replays readings, repeats the last one.
struct SeqSensor {
    seq: Vec<Reading>,
    idx: usize,
}

impl SeqSensor {
    fn new(seq: impl Into<Vec<Reading>>) -> Self {
        Self {
            seq: seq.into(),
            idx: 0,
        }
    }

    fn steady(left: u16, right: u16, feedback: u16) -> Self {
        Self::new([Reading {
            left,
            right,
            feedback,
        }])
    }
}

impl RangeSensor for SeqSensor {
    fn sample(&mut self) -> Result<Reading, Box<dyn Error + Send + Sync>> {
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

#[derive(Default, Clone)]
struct SpyDrive {
    commands: Arc<Mutex<Vec<DutyPair>>>,
}

impl SpyDrive {
    fn last(&self) -> Option<DutyPair> {
        self.commands.lock().unwrap().last().copied()
    }
    fn count(&self) -> usize {
        self.commands.lock().unwrap().len()
    }
}

impl Drive for SpyDrive {
    fn set_duty(&mut self, duty: DutyPair) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.commands.lock().unwrap().push(duty);
        Ok(())
    }
}

#[derive(Default, Clone)]
struct RecordingPanel {
    ops: Arc<Mutex<Vec<String>>>,
}

impl RecordingPanel {
    fn text(&self) -> String {
        self.ops.lock().unwrap().join("")
    }
    fn frames(&self) -> usize {
        self.text().matches("Duty: ").count()
    }
}

impl Panel for RecordingPanel {
    fn clear(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.ops.lock().unwrap().push("<clear>".into());
        Ok(())
    }
    fn set_cursor(&mut self, _col: u8, _row: u8) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.ops.lock().unwrap().push("\n".into());
        Ok(())
    }
    fn write_text(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.ops.lock().unwrap().push(text.into());
        Ok(())
    }
    fn write_unsigned(&mut self, n: u32) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.ops.lock().unwrap().push(n.to_string());
        Ok(())
    }
}

#[derive(Default, Clone)]
struct SpyIndicator {
    states: Arc<Mutex<Vec<IndicatorState>>>,
}

impl SpyIndicator {
    fn last(&self) -> Option<IndicatorState> {
        self.states.lock().unwrap().last().copied()
    }
}

impl Indicator for SpyIndicator {
    fn set(&mut self, state: IndicatorState) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.states.lock().unwrap().push(state);
        Ok(())
    }
}

fn fast_loop() -> LoopCfg {
    LoopCfg {
        sample_rate_hz: 1_000_000,
    }
}

#[test]
fn stopped_mode_skips_steering_entirely() {
    let sup = Arc::new(ModeSupervisor::new());
    let drive = SpyDrive::default();
    let panel = RecordingPanel::default();
    let indicator = SpyIndicator::default();

    // A NoopSensor errors on sample; the stopped branch must never reach it.
    let mut ctl = ControllerBuilder::new()
        .with_sensor(NoopSensor)
        .with_drive(drive.clone())
        .with_panel(panel.clone())
        .with_indicator(indicator.clone())
        .with_supervisor(Arc::clone(&sup))
        .with_loop_cfg(fast_loop())
        .build()
        .expect("build controller");

    let mut edge_handle = drive.clone();
    sup.on_stop_edge(&mut edge_handle).expect("stop edge");
    assert_eq!(drive.last(), Some(DutyPair::MIN));

    for _ in 0..3 {
        let status = ctl.step().expect("stopped step");
        assert_eq!(status, CycleStatus::Stopped);
    }
    // Handler command + one idempotent re-issue per iteration.
    assert_eq!(drive.count(), 4);
    assert_eq!(indicator.last(), Some(IndicatorState::Stopped));
    assert!(panel.text().contains("E-stop"));
}

#[test]
fn distance_estimate_updates_every_third_cycle_and_holds_between() {
    let sup = Arc::new(ModeSupervisor::new());
    let drive = SpyDrive::default();
    let mut ctl = ControllerBuilder::new()
        .with_sensor(SeqSensor::steady(2000, 2000, 2000))
        .with_drive(drive.clone())
        .with_panel(RecordingPanel::default())
        .with_indicator(SpyIndicator::default())
        .with_supervisor(sup)
        .with_loop_cfg(fast_loop())
        .build()
        .expect("build controller");

    let initial = ctl.distances();
    ctl.step().expect("step 1");
    assert_eq!(ctl.distances(), initial, "estimate must hold mid-window");
    ctl.step().expect("step 2");
    assert_eq!(ctl.distances(), initial, "estimate must hold mid-window");
    ctl.step().expect("step 3");
    let first = ctl.distances();
    assert_ne!(first, initial, "third sample completes the window");
    ctl.step().expect("step 4");
    assert_eq!(ctl.distances(), first, "held again until the next window");
}

#[test]
fn decision_flows_to_the_drive_and_indicator() {
    let sup = Arc::new(ModeSupervisor::new());
    let drive = SpyDrive::default();
    let indicator = SpyIndicator::default();
    let mut ctl = ControllerBuilder::new()
        .with_sensor(SeqSensor::steady(1000, 2000, 2000))
        .with_drive(drive.clone())
        .with_panel(RecordingPanel::default())
        .with_indicator(indicator.clone())
        .with_supervisor(sup)
        .with_loop_cfg(fast_loop())
        .build()
        .expect("build controller");

    let status = ctl.step().expect("step");
    match status {
        CycleStatus::Driving(s) => {
            assert_eq!(s.duty, DutyPair::new(5_000, 15_000));
            assert_eq!(s.indicator, IndicatorState::Left);
        }
        other => panic!("expected Driving, got {other:?}"),
    }
    assert_eq!(drive.last(), Some(DutyPair::new(5_000, 15_000)));
    assert_eq!(indicator.last(), Some(IndicatorState::Left));
}

#[test]
fn threshold_edge_lands_within_one_iteration() {
    // 1600 raw is reactive in NEAR mode only; the toggle between steps
    // must be visible on the very next decision.
    let sup = Arc::new(ModeSupervisor::new());
    let drive = SpyDrive::default();
    let mut ctl = ControllerBuilder::new()
        .with_sensor(SeqSensor::steady(1000, 1600, 2000))
        .with_drive(drive.clone())
        .with_panel(RecordingPanel::default())
        .with_indicator(SpyIndicator::default())
        .with_supervisor(Arc::clone(&sup))
        .with_loop_cfg(fast_loop())
        .build()
        .expect("build controller");

    match ctl.step().expect("step in FAR mode") {
        CycleStatus::Driving(s) => assert_eq!(s.indicator, IndicatorState::Idle),
        other => panic!("expected Driving, got {other:?}"),
    }

    sup.on_mode_edge();

    match ctl.step().expect("step in NEAR mode") {
        CycleStatus::Driving(s) => {
            assert_eq!(s.indicator, IndicatorState::Left);
            assert_eq!(s.duty, DutyPair::new(5_000, 15_000));
        }
        other => panic!("expected Driving, got {other:?}"),
    }
}

#[test]
fn refresh_reclassifies_duty_and_pushes_a_frame() {
    // feedback 3000 sits in the 100% band; refresh_ticks = 1 reclassifies
    // on the second step, so the third decision runs at max_high 40000.
    let sup = Arc::new(ModeSupervisor::new());
    let drive = SpyDrive::default();
    let panel = RecordingPanel::default();
    let mut ctl = ControllerBuilder::new()
        .with_sensor(SeqSensor::steady(1000, 1000, 3000))
        .with_drive(drive.clone())
        .with_panel(panel.clone())
        .with_indicator(SpyIndicator::default())
        .with_supervisor(sup)
        .with_loop_cfg(fast_loop())
        .with_drive_cfg(DriveCfg { pwm_period: 40_000 })
        .with_display_cfg(DisplayCfg { refresh_ticks: 1 })
        .build()
        .expect("build controller");

    // Step 1: still the startup 50% class; tie biases left.
    ctl.step().expect("step 1");
    assert_eq!(drive.last(), Some(DutyPair::new(20_000, 20_500)));

    // Step 2: refresh fires, frame pushed, class becomes 100%.
    ctl.step().expect("step 2");
    assert!(panel.text().contains("Duty: 100%"));
    assert!(panel.text().contains("avoid: 20cm"));

    // Step 3: the tie bias would command 40500 on a 40000 carrier; the
    // output boundary clamps it while the decision stays table-exact.
    match ctl.step().expect("step 3") {
        CycleStatus::Driving(s) => assert_eq!(s.duty, DutyPair::new(40_000, 40_500)),
        other => panic!("expected Driving, got {other:?}"),
    }
    assert_eq!(drive.last(), Some(DutyPair::new(40_000, 40_000)));
}

#[test]
fn frame_cadence_follows_the_counter() {
    let sup = Arc::new(ModeSupervisor::new());
    let panel = RecordingPanel::default();
    let mut ctl = ControllerBuilder::new()
        .with_sensor(SeqSensor::steady(1000, 1000, 2000))
        .with_drive(SpyDrive::default())
        .with_panel(panel.clone())
        .with_indicator(SpyIndicator::default())
        .with_supervisor(sup)
        .with_loop_cfg(fast_loop())
        .with_display_cfg(DisplayCfg { refresh_ticks: 2 })
        .build()
        .expect("build controller");

    for _ in 0..5 {
        ctl.step().expect("step");
    }
    // Counter hits the period on the 3rd pass, then every 2nd pass after.
    assert_eq!(panel.frames(), 2);
}

#[test]
fn frame_reports_the_distance_estimate() {
    // 2000 raw averages to roughly 20 cm through the calibration curve.
    let sup = Arc::new(ModeSupervisor::new());
    let panel = RecordingPanel::default();
    let mut ctl = ControllerBuilder::new()
        .with_sensor(SeqSensor::steady(2000, 2000, 2000))
        .with_drive(SpyDrive::default())
        .with_panel(panel.clone())
        .with_indicator(SpyIndicator::default())
        .with_supervisor(sup)
        .with_loop_cfg(fast_loop())
        .with_display_cfg(DisplayCfg { refresh_ticks: 3 })
        .build()
        .expect("build controller");

    for _ in 0..4 {
        ctl.step().expect("step");
    }
    let text = panel.text();
    let cm = u32::from(ctl.distances().left_cm);
    assert!(text.contains(&format!("L:{cm}cm")), "panel: {text}");
    assert!(text.contains(&format!("R:{cm}cm")), "panel: {text}");
}

#[test]
fn bounded_run_parks_the_motors() {
    let sup = Arc::new(ModeSupervisor::new());
    let drive = SpyDrive::default();
    let mut ctl = ControllerBuilder::new()
        .with_sensor(SeqSensor::steady(1000, 2000, 2000))
        .with_drive(drive.clone())
        .with_panel(RecordingPanel::default())
        .with_indicator(SpyIndicator::default())
        .with_supervisor(sup)
        .with_loop_cfg(fast_loop())
        .build()
        .expect("build controller");

    let cycles = runner::run_cycles(&mut ctl, 4).expect("bounded run");
    assert_eq!(cycles, 4);
    assert_eq!(drive.last(), Some(DutyPair::MIN));
    assert_eq!(drive.count(), 5);
}

#[test]
fn builder_reports_each_missing_piece() {
    let err = ControllerBuilder::new()
        .with_sensor(NoopSensor)
        .with_drive(SpyDrive::default())
        .try_build()
        .expect_err("panel is missing");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingPanel)
    ));

    let err = ControllerBuilder::new().try_build().expect_err("sensor is missing");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingSensor)
    ));
}

#[test]
fn builder_rejects_invalid_pacing() {
    let err = ControllerBuilder::new()
        .with_sensor(NoopSensor)
        .with_drive(SpyDrive::default())
        .with_panel(RecordingPanel::default())
        .with_indicator(SpyIndicator::default())
        .with_loop_cfg(LoopCfg { sample_rate_hz: 0 })
        .build()
        .expect_err("zero rate must be rejected");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
}
