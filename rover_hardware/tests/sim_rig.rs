use rover_hardware::{SimulatedDrive, SimulatedIndicator, SimulatedPanel, SimulatedRangeSensor};
use rover_traits::{Drive, DutyPair, Indicator, IndicatorState, Panel, RangeSensor};
use rstest::rstest;

#[rstest]
#[case(500, 500)]
#[case(2000, 1000)]
fn steady_scene_repeats_forever(#[case] left: u16, #[case] right: u16) {
    let mut s = SimulatedRangeSensor::steady(left, right);
    for _ in 0..5 {
        let r = s.sample().expect("sim sample");
        assert_eq!((r.left, r.right), (left, right));
        // Feedback pinned inside the 50%-duty band.
        assert!((1400..=2300).contains(&r.feedback));
    }
}

#[test]
fn empty_script_reads_all_zero() {
    let mut s = SimulatedRangeSensor::new([]);
    let r = s.sample().expect("sim sample");
    assert_eq!((r.left, r.right, r.feedback), (0, 0, 0));
}

#[test]
fn cloned_drive_handle_observes_button_thread_commands() {
    // The stop edge runs on another thread with its own handle; both
    // handles must see one shared channel state.
    let drive = SimulatedDrive::new();
    let mut handler_handle = drive.clone();
    let t = std::thread::spawn(move || {
        handler_handle.set_duty(DutyPair::MIN).expect("sim duty");
    });
    t.join().expect("join");
    assert_eq!(drive.last(), Some(DutyPair::MIN));
}

#[test]
fn indicator_keeps_full_history() {
    let ind = SimulatedIndicator::new();
    let mut i = ind.clone();
    i.set(IndicatorState::Left).unwrap();
    i.set(IndicatorState::Idle).unwrap();
    i.set(IndicatorState::Stopped).unwrap();
    assert_eq!(ind.last(), Some(IndicatorState::Stopped));
    assert_eq!(ind.history().len(), 3);
}

#[test]
fn panel_clear_wipes_rows_and_counts() {
    let panel = SimulatedPanel::new();
    let mut p = panel.clone();
    p.write_text("E-stop").unwrap();
    assert!(panel.text().contains("E-stop"));
    p.clear().unwrap();
    assert!(panel.text().is_empty());
    assert_eq!(panel.clears(), 1);
}
