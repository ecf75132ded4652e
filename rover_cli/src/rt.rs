//! Real-time scheduling helpers (Linux SCHED_FIFO / affinity / mlockall).

use crate::cli::RtLock;

#[cfg(target_os = "linux")]
pub fn setup_rt_once(rt: bool, prio: Option<i32>, lock: RtLock, rt_cpu: Option<usize>) {
    use libc::{
        CPU_SET, CPU_ZERO, SCHED_FIFO, sched_get_priority_max, sched_get_priority_min, sched_param,
        sched_setaffinity, sched_setscheduler,
    };
    use std::sync::OnceLock;
    static RT_ONCE: OnceLock<()> = OnceLock::new();

    if !rt {
        return;
    }

    RT_ONCE.get_or_init(|| {
        apply_mem_lock(lock);

        // SAFETY: plain libc scheduling calls on the current process; the
        // cpu_set_t is zero-initialized before CPU_ZERO/CPU_SET touch it.
        unsafe {
            let min = sched_get_priority_min(SCHED_FIFO);
            let max = sched_get_priority_max(SCHED_FIFO);
            let wanted = prio.unwrap_or(min.max(1));
            let priority = wanted.clamp(min.max(1), max.max(1));
            let param = sched_param {
                sched_priority: priority,
            };
            if sched_setscheduler(0, SCHED_FIFO, &param) != 0 {
                tracing::warn!(
                    error = %std::io::Error::last_os_error(),
                    "SCHED_FIFO not applied; running with the default scheduler"
                );
            } else {
                tracing::info!(priority, "SCHED_FIFO applied");
            }

            let cpu = rt_cpu.unwrap_or(0);
            let mut set: libc::cpu_set_t = std::mem::zeroed();
            CPU_ZERO(&mut set);
            CPU_SET(cpu, &mut set);
            if sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set) != 0 {
                tracing::warn!(cpu, error = %std::io::Error::last_os_error(), "cpu affinity not applied");
            } else {
                tracing::info!(cpu, "cpu affinity applied");
            }
        }
    });
}

#[cfg(target_os = "linux")]
fn apply_mem_lock(lock: RtLock) {
    use libc::{MCL_CURRENT, MCL_FUTURE, mlockall};

    let flags = match lock {
        RtLock::None => return,
        RtLock::Current => MCL_CURRENT,
        RtLock::All => MCL_CURRENT | MCL_FUTURE,
    };
    // SAFETY: mlockall only pins the current address space; no pointers.
    let rc = unsafe { mlockall(flags) };
    if rc != 0 {
        tracing::warn!(
            ?lock,
            error = %std::io::Error::last_os_error(),
            "mlockall failed; check the memlock ulimit"
        );
    } else {
        tracing::info!(?lock, "memory locked");
    }
}

#[cfg(not(target_os = "linux"))]
pub fn setup_rt_once(rt: bool, _prio: Option<i32>, _lock: RtLock, _rt_cpu: Option<usize>) {
    if rt {
        tracing::warn!("--rt requested but real-time setup is Linux-only; ignoring");
    }
}
