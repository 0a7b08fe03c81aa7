use std::time::Duration;

use rand::Rng;

/// Exponential backoff with jitter, shared across all named pipelines.
#[derive(Debug, Clone, Copy)]
pub struct RetrySettings {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Backoff before the first retry.
    pub base_delay: Duration,
    /// Upper bound on any single backoff, before jitter.
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each failed attempt.
    pub backoff_multiplier: f64,
    /// Fraction of the computed delay randomized away, in `[0, 1]`.
    pub jitter_fraction: f64,
}

impl RetrySettings {
    /// Delay to wait before `retry_index` (0-based, 0 = first retry
    /// after the initial attempt).
    #[must_use]
    pub fn delay_for(&self, retry_index: u32) -> Duration {
        let unjittered = self.base_delay.as_secs_f64() * self.backoff_multiplier.powi(retry_index as i32);
        let capped = unjittered.min(self.max_delay.as_secs_f64());
        let jitter_span = capped * self.jitter_fraction;
        let jitter = if jitter_span > 0.0 {
            rand::thread_rng().gen_range(-jitter_span..=jitter_span)
        } else {
            0.0
        };
        Duration::from_secs_f64((capped + jitter).max(0.0))
    }

    /// Whether another attempt is permitted after `attempts_so_far`
    /// (including the initial attempt) have failed.
    #[must_use]
    pub fn should_retry(&self, attempts_so_far: u32) -> bool {
        attempts_so_far < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_exponentially_and_respects_cap() {
        let settings = RetrySettings {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            jitter_fraction: 0.0,
        };
        assert_eq!(settings.delay_for(0), Duration::from_millis(100));
        assert_eq!(settings.delay_for(1), Duration::from_millis(200));
        assert_eq!(settings.delay_for(2), Duration::from_millis(400));
        assert_eq!(settings.delay_for(10), Duration::from_secs(2));
    }

    #[test]
    fn should_retry_respects_max_attempts() {
        let settings = RetrySettings {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            jitter_fraction: 0.1,
        };
        assert!(settings.should_retry(2));
        assert!(!settings.should_retry(3));
    }
}
