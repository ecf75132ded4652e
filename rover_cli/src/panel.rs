//! Simulated operator panel: maps stdin keys onto the button edges.
//!
//! This thread is the simulation's stand-in for the GPIO interrupt path:
//! it owns its own drive handle so the stop edge can park the motors
//! immediately, exactly like the real button handler.
//!
//! Keys: `s` toggles the emergency stop, `m` toggles the avoidance mode,
//! `q` requests shutdown.

use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rover_core::ModeSupervisor;
use rover_traits::Drive;

pub fn spawn<D>(
    supervisor: Arc<ModeSupervisor>,
    mut drive: D,
    shutdown: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()>
where
    D: Drive + Send + 'static,
{
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            for key in line.trim().chars() {
                match key {
                    's' => {
                        if let Err(e) = supervisor.on_stop_edge(&mut drive) {
                            tracing::warn!(error = %e, "stop edge failed");
                        }
                    }
                    'm' => supervisor.on_mode_edge(),
                    'q' => {
                        shutdown.store(true, Ordering::Relaxed);
                        return;
                    }
                    _ => {}
                }
            }
        }
    })
}
