use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};
use warden_domain::error::{Error, Result};

use super::breaker::CircuitBreaker;
use super::retry::RetrySettings;
use super::timeout::AdaptiveTimeout;

/// Bundled settings for one named pipeline; constructed once per
/// dependency at wiring time (§4.7).
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub retry: RetrySettings,
    pub breaker: super::breaker::CircuitBreakerSettings,
}

/// A retry -> circuit-breaker -> timeout pipeline for one external
/// dependency. Named instances (`LLMPipeline`, `EmbeddingPipeline`,
/// `VectorStorePipeline`, `BlobStoragePipeline`) differ only in the
/// settings passed to [`NamedPipeline::new`].
pub struct NamedPipeline {
    name: &'static str,
    retry: RetrySettings,
    breaker: CircuitBreaker,
}

impl NamedPipeline {
    /// Builds a pipeline identified by `name`, used only in log fields.
    #[must_use]
    pub fn new(name: &'static str, settings: PipelineSettings) -> Self {
        Self {
            name,
            retry: settings.retry,
            breaker: CircuitBreaker::new(settings.breaker),
        }
    }

    /// Runs `call` under the full pipeline: each attempt must first pass
    /// the breaker, is bounded by `per_attempt_timeout`, and is retried
    /// with backoff up to `retry.max_attempts` times. Returns the first
    /// success, or the last error once retries are exhausted or the
    /// breaker is open.
    pub async fn run<F, Fut, T>(&self, per_attempt_timeout: Duration, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0u32;
        loop {
            if !self.breaker.try_acquire().await {
                warn!(pipeline = self.name, "circuit breaker open, failing fast");
                return Err(Error::circuit_open(format!("{} circuit breaker is open", self.name)));
            }

            let outcome = tokio::time::timeout(per_attempt_timeout, call()).await;

            let result: std::result::Result<T, Error> = match outcome {
                Ok(Ok(value)) => {
                    self.breaker.record_success().await;
                    return Ok(value);
                }
                Ok(Err(err)) => Err(err),
                Err(_) => Err(Error::Timeout {
                    streaming: false,
                    elapsed_ms: per_attempt_timeout.as_millis() as u64,
                    requested_timeout_ms: per_attempt_timeout.as_millis() as u64,
                    tokens_requested: 0,
                    partial: None,
                }),
            };

            self.breaker.record_failure().await;
            attempt += 1;

            let err = result.expect_err("checked above");
            if !err.kind().is_retriable() || !self.retry.should_retry(attempt) {
                return Err(err);
            }

            let delay = self.retry.delay_for(attempt - 1);
            debug!(pipeline = self.name, attempt, delay_ms = delay.as_millis() as u64, "retrying after failure");
            tokio::time::sleep(delay).await;
        }
    }

    /// Adaptive timeout for one attempt, given a retry index and
    /// streaming flag.
    #[must_use]
    pub fn timeout_for(adaptive: &AdaptiveTimeout, max_tokens: u32, is_streaming: bool, retry_index: u32) -> Duration {
        adaptive.for_attempt(max_tokens, is_streaming, retry_index)
    }
}
