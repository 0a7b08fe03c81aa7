use std::time::Duration;

use crate::config::TimeoutStrategyConfig;

/// Computes per-call timeouts from a [`TimeoutStrategyConfig`] (§4.4).
///
/// `timeout = clamp(base + max_tokens * per_token_ms / 1000, min, max)`,
/// then scaled by the streaming multiplier and, per retry attempt, by
/// `retry_timeout_multiplier ^ retry_index`.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveTimeout {
    settings: TimeoutStrategyConfig,
    use_adaptive: bool,
}

impl AdaptiveTimeout {
    /// Builds a calculator from strategy settings. `use_adaptive = false`
    /// makes every call resolve to `static_timeout_seconds`, falling back
    /// to `max_timeout_seconds` when that is unset (§9, Open Question 1).
    #[must_use]
    pub fn new(settings: TimeoutStrategyConfig, use_adaptive: bool) -> Self {
        Self { settings, use_adaptive }
    }

    /// Timeout for a non-streaming call at the first attempt.
    #[must_use]
    pub fn base_for(&self, max_tokens: u32) -> Duration {
        self.for_attempt(max_tokens, false, 0)
    }

    /// Timeout for a call with the given `max_tokens`, streaming flag,
    /// and 0-based retry index.
    #[must_use]
    pub fn for_attempt(&self, max_tokens: u32, is_streaming: bool, retry_index: u32) -> Duration {
        let base_seconds = if self.use_adaptive {
            let raw = self.settings.base_timeout_seconds
                + (f64::from(max_tokens) * self.settings.per_token_timeout_ms / 1000.0);
            raw.clamp(self.settings.min_timeout_seconds, self.settings.max_timeout_seconds)
        } else {
            self.settings
                .static_timeout_seconds
                .unwrap_or(self.settings.max_timeout_seconds)
        };

        let streaming_factor = if is_streaming {
            self.settings.streaming_timeout_multiplier
        } else {
            1.0
        };
        let retry_factor = self.settings.retry_timeout_multiplier.powi(retry_index as i32);

        Duration::from_secs_f64(base_seconds * streaming_factor * retry_factor)
    }
}
