//! Watchdog (§4.11): a long-lived heartbeat tracker that cancels stuck
//! operations. Process-wide singleton with explicit lifecycle, per the
//! Design Notes (§9); no direct teacher file grounds this component, so
//! it is built fresh in the teacher's construction-injected idiom.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use warden_domain::entities::ProjectId;
use warden_domain::ports::Watchdog;

struct Registration {
    cancellation: CancellationToken,
    started_at: Instant,
    last_heartbeat_at: Instant,
    last_phase: String,
    stuck_observations: u32,
}

/// Configuration mirroring the `Watchdog` configuration group (§6).
#[derive(Debug, Clone, Copy)]
pub struct WatchdogSettings {
    /// Scan cadence.
    pub check_interval: Duration,
    /// Maximum total job duration.
    pub max_project_duration: Duration,
    /// Maximum gap between heartbeats.
    pub max_heartbeat_interval: Duration,
    /// Whether stuck jobs are automatically cancelled.
    pub auto_cancel_stuck: bool,
    /// Consecutive stuck observations required before cancelling.
    pub stuck_detection_threshold: u32,
}

impl Default for WatchdogSettings {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(30),
            max_project_duration: Duration::from_secs(600),
            max_heartbeat_interval: Duration::from_secs(120),
            auto_cancel_stuck: true,
            stuck_detection_threshold: 2,
        }
    }
}

/// In-process watchdog over all currently-registered jobs.
pub struct BackgroundWatchdog {
    registrations: DashMap<ProjectId, Registration>,
    settings: WatchdogSettings,
}

impl BackgroundWatchdog {
    /// Builds a watchdog with the given settings. Disabling the watchdog
    /// (`settings.auto_cancel_stuck = false` combined with no scan loop
    /// spawned) must not change healthy-path behavior: registration and
    /// heartbeats remain no-ops on the hot path either way.
    #[must_use]
    pub fn new(settings: WatchdogSettings) -> Self {
        Self {
            registrations: DashMap::new(),
            settings,
        }
    }

    /// Scans all registrations once, requesting cancellation for any job
    /// observed stuck `stuck_detection_threshold` times in a row. Intended
    /// to be called on a timer at `check_interval` cadence by the worker.
    pub fn scan_once(&self) {
        let now = Instant::now();
        for mut entry in self.registrations.iter_mut() {
            let stuck = now.duration_since(entry.last_heartbeat_at) > self.settings.max_heartbeat_interval
                || now.duration_since(entry.started_at) > self.settings.max_project_duration;

            if stuck {
                entry.stuck_observations += 1;
                warn!(
                    project_id = %entry.key(),
                    observations = entry.stuck_observations,
                    last_phase = %entry.last_phase,
                    "watchdog observed stuck job"
                );
                if entry.stuck_observations >= self.settings.stuck_detection_threshold {
                    if self.settings.auto_cancel_stuck {
                        entry.cancellation.cancel();
                        info!(project_id = %entry.key(), "watchdog cancelled stuck job");
                    } else {
                        info!(project_id = %entry.key(), "watchdog would cancel (auto_cancel_stuck disabled)");
                    }
                }
            } else {
                entry.stuck_observations = 0;
            }
        }
    }
}

impl Watchdog for BackgroundWatchdog {
    fn register(&self, project_id: ProjectId, cancellation: CancellationToken) {
        let now = Instant::now();
        self.registrations.insert(
            project_id,
            Registration {
                cancellation,
                started_at: now,
                last_heartbeat_at: now,
                last_phase: String::new(),
                stuck_observations: 0,
            },
        );
    }

    fn heartbeat(&self, project_id: ProjectId, phase: &str) {
        if let Some(mut entry) = self.registrations.get_mut(&project_id) {
            entry.last_heartbeat_at = Instant::now();
            entry.last_phase = phase.to_string();
            entry.stuck_observations = 0;
        }
    }

    fn complete(&self, project_id: ProjectId) {
        self.registrations.remove(&project_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stuck_after_threshold_observations_cancels() {
        let settings = WatchdogSettings {
            check_interval: Duration::from_millis(1),
            max_project_duration: Duration::from_secs(600),
            max_heartbeat_interval: Duration::from_millis(0),
            auto_cancel_stuck: true,
            stuck_detection_threshold: 2,
        };
        let watchdog = BackgroundWatchdog::new(settings);
        let project_id = ProjectId::new();
        let token = CancellationToken::new();
        watchdog.register(project_id, token.clone());

        watchdog.scan_once();
        assert!(!token.is_cancelled());
        watchdog.scan_once();
        assert!(token.is_cancelled());
    }

    #[test]
    fn healthy_heartbeats_reset_stuck_counter() {
        let settings = WatchdogSettings {
            max_heartbeat_interval: Duration::from_secs(600),
            ..WatchdogSettings::default()
        };
        let watchdog = BackgroundWatchdog::new(settings);
        let project_id = ProjectId::new();
        let token = CancellationToken::new();
        watchdog.register(project_id, token.clone());
        watchdog.heartbeat(project_id, "Chunking");
        watchdog.scan_once();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn disabling_auto_cancel_still_logs_without_cancelling() {
        let settings = WatchdogSettings {
            max_heartbeat_interval: Duration::from_millis(0),
            auto_cancel_stuck: false,
            stuck_detection_threshold: 1,
            ..WatchdogSettings::default()
        };
        let watchdog = BackgroundWatchdog::new(settings);
        let project_id = ProjectId::new();
        let token = CancellationToken::new();
        watchdog.register(project_id, token.clone());
        watchdog.scan_once();
        assert!(!token.is_cancelled());
    }
}
