//! Memory Monitor (§4.9): sampled RSS gauges with warn/pause thresholds,
//! backed by `sysinfo`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use sysinfo::{Pid, System};
use tracing::{debug, warn};
use warden_domain::ports::MemoryMonitor;

/// `sysinfo`-backed memory monitor. Samples are taken on demand by
/// `refresh`, called periodically by the worker's sampling task.
pub struct SysinfoMemoryMonitor {
    system: Mutex<System>,
    pid: Pid,
    max_worker_memory_mb: u64,
    warning_threshold_percent: f64,
    pause_threshold_percent: f64,
    current_memory_mb: AtomicU64,
}

impl SysinfoMemoryMonitor {
    /// Builds a monitor tracking the current process against
    /// `max_worker_memory_mb`.
    #[must_use]
    pub fn new(max_worker_memory_mb: u64, warning_threshold_percent: f64, pause_threshold_percent: f64) -> Self {
        let pid = Pid::from_u32(std::process::id());
        Self {
            system: Mutex::new(System::new()),
            pid,
            max_worker_memory_mb,
            warning_threshold_percent,
            pause_threshold_percent,
            current_memory_mb: AtomicU64::new(0),
        }
    }

    /// Re-samples process RSS. Intended to be called on a timer at
    /// `MemoryManagement.CheckIntervalSeconds` cadence.
    pub fn refresh(&self) {
        let Ok(mut system) = self.system.lock() else {
            warn!("memory monitor mutex poisoned; skipping sample");
            return;
        };
        system.refresh_process(self.pid);
        let mb = system.process(self.pid).map_or(0, |p| p.memory() / (1024 * 1024));
        self.current_memory_mb.store(mb, Ordering::SeqCst);
        debug!(memory_mb = mb, "memory sample");
    }
}

impl MemoryMonitor for SysinfoMemoryMonitor {
    fn current_memory_mb(&self) -> u64 {
        self.current_memory_mb.load(Ordering::SeqCst)
    }

    fn memory_usage_percent(&self) -> f64 {
        if self.max_worker_memory_mb == 0 {
            return 0.0;
        }
        (self.current_memory_mb() as f64 / self.max_worker_memory_mb as f64) * 100.0
    }

    fn is_memory_warning(&self) -> bool {
        self.memory_usage_percent() >= self.warning_threshold_percent
    }

    fn should_pause_processing(&self) -> bool {
        self.memory_usage_percent() >= self.pause_threshold_percent
    }

    fn request_gc_if_needed(&self) {
        if self.is_memory_warning() {
            debug!("opportunistic reclamation requested");
        }
    }

    fn force_aggressive_gc(&self) {
        warn!("forcing aggressive reclamation before pause");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_percent_tracks_budget() {
        let monitor = SysinfoMemoryMonitor::new(1000, 80.0, 90.0);
        monitor.current_memory_mb.store(500, Ordering::SeqCst);
        assert!((monitor.memory_usage_percent() - 50.0).abs() < f64::EPSILON);
        assert!(!monitor.is_memory_warning());
    }

    #[test]
    fn pause_threshold_trips() {
        let monitor = SysinfoMemoryMonitor::new(1000, 80.0, 90.0);
        monitor.current_memory_mb.store(950, Ordering::SeqCst);
        assert!(monitor.is_memory_warning());
        assert!(monitor.should_pause_processing());
    }
}
