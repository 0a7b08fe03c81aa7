use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Observed state of a [`CircuitBreaker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Calls pass through normally.
    Closed,
    /// Calls fail fast without reaching the dependency.
    Open,
    /// A single probe call is allowed through to test recovery.
    HalfOpen,
}

/// Breaker configuration: trips after `failure_threshold` consecutive
/// failures, stays open for `open_duration`, then allows one half-open
/// probe.
#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerSettings {
    /// Consecutive failures before tripping open.
    pub failure_threshold: u32,
    /// How long the breaker stays open before a half-open probe.
    pub open_duration: Duration,
}

/// A per-dependency circuit breaker. Cheap to share via `Arc`; internal
/// state is behind atomics and a small async mutex for the half-open
/// single-probe gate.
pub struct CircuitBreaker {
    settings: CircuitBreakerSettings,
    consecutive_failures: AtomicU32,
    opened_at_millis: AtomicU64,
    half_open_probe_in_flight: Mutex<bool>,
}

impl CircuitBreaker {
    /// Builds a closed breaker with the given settings.
    #[must_use]
    pub fn new(settings: CircuitBreakerSettings) -> Self {
        Self {
            settings,
            consecutive_failures: AtomicU32::new(0),
            opened_at_millis: AtomicU64::new(0),
            half_open_probe_in_flight: Mutex::new(false),
        }
    }

    fn now_millis() -> u64 {
        // relative wall clock, not assumed to start at any epoch
        static START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
        let start = *START.get_or_init(Instant::now);
        start.elapsed().as_millis() as u64
    }

    /// Current observed state.
    #[must_use]
    pub fn state(&self) -> BreakerState {
        let opened_at = self.opened_at_millis.load(Ordering::SeqCst);
        if opened_at == 0 {
            return BreakerState::Closed;
        }
        let elapsed = Self::now_millis().saturating_sub(opened_at);
        if elapsed >= self.settings.open_duration.as_millis() as u64 {
            BreakerState::HalfOpen
        } else {
            BreakerState::Open
        }
    }

    /// Attempts to reserve permission to call the dependency. Returns
    /// `true` if the call may proceed (closed, or the single half-open
    /// probe slot); `false` means fail fast.
    pub async fn try_acquire(&self) -> bool {
        match self.state() {
            BreakerState::Closed => true,
            BreakerState::Open => false,
            BreakerState::HalfOpen => {
                let mut probe = self.half_open_probe_in_flight.lock().await;
                if *probe {
                    false
                } else {
                    *probe = true;
                    true
                }
            }
        }
    }

    /// Records a successful call, closing the breaker and releasing any
    /// half-open probe reservation.
    pub async fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::SeqCst);
        self.opened_at_millis.store(0, Ordering::SeqCst);
        *self.half_open_probe_in_flight.lock().await = false;
    }

    /// Records a failed call, tripping the breaker open once
    /// `failure_threshold` consecutive failures have been observed.
    pub async fn record_failure(&self) {
        let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
        *self.half_open_probe_in_flight.lock().await = false;
        if failures >= self.settings.failure_threshold {
            self.opened_at_millis.store(Self::now_millis().max(1), Ordering::SeqCst);
        }
    }
}
