//! Rig assembly and the drive / self-check / health commands.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use eyre::WrapErr;
use rover_config::Config;
use rover_core::error::Result;
use rover_core::{Controller, ModeSupervisor, runner};
use rover_traits::{Drive, Indicator, Panel, RangeSensor, Reading};

use crate::cli::RtLock;
use crate::rt;

/// Scene replayed by the simulated front-end: a straight run, an obstacle
/// closing in on the right, a sharp wall, then open floor again.
#[cfg(not(feature = "hardware"))]
fn sim_scene() -> rover_hardware::SimulatedRangeSensor {
    let mut seq = Vec::new();
    for _ in 0..40 {
        seq.push(Reading {
            left: 1200,
            right: 1100,
            feedback: 2000,
        });
    }
    for step in 0u16..30 {
        seq.push(Reading {
            left: 1100,
            right: 1900 + step * 40,
            feedback: 2000,
        });
    }
    for _ in 0..20 {
        seq.push(Reading {
            left: 1100,
            right: 3500,
            feedback: 2000,
        });
    }
    seq.push(Reading {
        left: 1150,
        right: 1150,
        feedback: 2000,
    });
    rover_hardware::SimulatedRangeSensor::new(seq)
}

#[allow(clippy::too_many_arguments)]
pub fn run_drive(
    cfg: &Config,
    cycles: Option<u64>,
    rt_on: bool,
    rt_prio: Option<i32>,
    rt_lock: Option<RtLock>,
    rt_cpu: Option<usize>,
    json: bool,
) -> Result<()> {
    rt::setup_rt_once(
        rt_on,
        rt_prio,
        rt_lock.unwrap_or_else(RtLock::os_default),
        rt_cpu,
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        ctrlc::set_handler(move || shutdown.store(true, Ordering::Relaxed))
            .wrap_err("install ctrl-c handler")?;
    }
    let supervisor = Arc::new(ModeSupervisor::new());

    run_rig(cfg, cycles, supervisor, shutdown, json)
}

#[cfg(not(feature = "hardware"))]
fn run_rig(
    cfg: &Config,
    cycles: Option<u64>,
    supervisor: Arc<ModeSupervisor>,
    shutdown: Arc<AtomicBool>,
    json: bool,
) -> Result<()> {
    use rover_hardware::{LogIndicator, LogPanel, SimulatedDrive};

    let drive_out = SimulatedDrive::new();
    // The stdin panel thread is the simulation's interrupt path; it gets
    // its own handle onto the motor outputs.
    let _panel_thread = crate::panel::spawn(
        Arc::clone(&supervisor),
        drive_out.clone(),
        Arc::clone(&shutdown),
    );

    let mut ctl = rover_core::build_controller(
        sim_scene(),
        drive_out,
        LogPanel::new(),
        LogIndicator::new(),
        Arc::clone(&supervisor),
        (&cfg.filter).into(),
        (&cfg.drive).into(),
        (&cfg.display).into(),
        None,
    )?;
    finish(&mut ctl, &supervisor, cycles, &shutdown, json)
}

#[cfg(feature = "hardware")]
fn run_rig(
    cfg: &Config,
    cycles: Option<u64>,
    supervisor: Arc<ModeSupervisor>,
    shutdown: Arc<AtomicBool>,
    json: bool,
) -> Result<()> {
    use rover_hardware::{LogIndicator, LogPanel, buttons, mcp3008::Mcp3008Frontend, pwm};

    let sensor = Mcp3008Frontend::new(
        cfg.pins.adc_left,
        cfg.pins.adc_right,
        cfg.pins.adc_feedback,
    )
    .map_err(eyre::Report::new)
    .wrap_err("open ADC front-end")?;
    let drive_out = pwm::HardwareDrive::new(cfg.drive.pwm_period)
        .map_err(eyre::Report::new)
        .wrap_err("open PWM drive")?;

    // Button edges dispatch straight into the supervisor callbacks; the
    // stop handler carries its own drive handle.
    let _buttons = {
        let sup = Arc::clone(&supervisor);
        let mut handle = drive_out.clone();
        let on_stop = move || {
            if let Err(e) = sup.on_stop_edge(&mut handle) {
                tracing::warn!(error = %e, "stop edge failed");
            }
        };
        let sup = Arc::clone(&supervisor);
        let on_mode = move || sup.on_mode_edge();
        buttons::watch(
            cfg.pins.button_stop,
            cfg.pins.button_mode,
            cfg.buttons.active_low,
            cfg.buttons.debounce_ms,
            on_stop,
            on_mode,
        )
        .map_err(eyre::Report::new)
        .wrap_err("arm buttons")?
    };

    let mut ctl = rover_core::build_controller(
        sensor,
        drive_out,
        LogPanel::new(),
        LogIndicator::new(),
        Arc::clone(&supervisor),
        (&cfg.filter).into(),
        (&cfg.drive).into(),
        (&cfg.display).into(),
        None,
    )?;
    finish(&mut ctl, &supervisor, cycles, &shutdown, json)
}

fn finish<S, D, P, I>(
    ctl: &mut Controller<S, D, P, I>,
    supervisor: &ModeSupervisor,
    cycles: Option<u64>,
    shutdown: &AtomicBool,
    json: bool,
) -> Result<()>
where
    S: RangeSensor,
    D: Drive,
    P: Panel,
    I: Indicator,
{
    let driven = match cycles {
        Some(n) => runner::run_cycles(ctl, n)?,
        None => runner::run(ctl, shutdown)?,
    };

    let d = ctl.distances();
    if json {
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "cycles": driven,
                "left_cm": d.left_cm,
                "right_cm": d.right_cm,
                "duty_pct": ctl.duty_class().percent(),
                "stopped": supervisor.stopped(),
            })
        );
    } else {
        println!(
            "drove {driven} cycles; L={} cm R={} cm, duty {}%{}",
            d.left_cm,
            d.right_cm,
            ctl.duty_class().percent(),
            if supervisor.stopped() { " (stopped)" } else { "" }
        );
    }
    Ok(())
}

pub fn self_check(cfg: &Config, json: bool) -> Result<()> {
    let reading = self_check_rig(cfg)?;
    if json {
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "left": reading.left,
                "right": reading.right,
                "feedback": reading.feedback,
            })
        );
    } else {
        println!(
            "self-check: ok (L={} R={} fb={})",
            reading.left, reading.right, reading.feedback
        );
    }
    Ok(())
}

#[cfg(not(feature = "hardware"))]
fn self_check_rig(_cfg: &Config) -> Result<Reading> {
    use rover_hardware::SimulatedDrive;
    use rover_traits::DutyPair;

    let mut sensor = sim_scene();
    let mut drive_out = SimulatedDrive::new();
    let reading = sensor.sample().map_err(|e| eyre::eyre!("sim sample: {e}"))?;
    drive_out
        .set_duty(DutyPair::MIN)
        .map_err(|e| eyre::eyre!("sim duty: {e}"))?;
    Ok(reading)
}

#[cfg(feature = "hardware")]
fn self_check_rig(cfg: &Config) -> Result<Reading> {
    use rover_hardware::{mcp3008::Mcp3008Frontend, pwm};
    use rover_traits::DutyPair;

    let mut sensor = Mcp3008Frontend::new(
        cfg.pins.adc_left,
        cfg.pins.adc_right,
        cfg.pins.adc_feedback,
    )
    .map_err(eyre::Report::new)
    .wrap_err("open ADC front-end")?;
    let mut drive_out = pwm::HardwareDrive::new(cfg.drive.pwm_period)
        .map_err(eyre::Report::new)
        .wrap_err("open PWM drive")?;
    let reading = sensor.sample().map_err(|e| eyre::eyre!("adc sample: {e}"))?;
    drive_out
        .set_duty(DutyPair::MIN)
        .map_err(|e| eyre::eyre!("pwm duty: {e}"))?;
    Ok(reading)
}

pub fn health(json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "name": "rover",
                "version": env!("CARGO_PKG_VERSION"),
            })
        );
    } else {
        println!("rover {} ok", env!("CARGO_PKG_VERSION"));
    }
    Ok(())
}
