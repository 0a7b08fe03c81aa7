use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use warden_domain::error::Result;
use warden_domain::ports::EmbeddingProvider;
use warden_infrastructure::resilience::NamedPipeline;

/// Wraps an [`EmbeddingProvider`] with the `EmbeddingPipeline` (§4.7:
/// bounded retries, its own circuit breaker, 5-minute total timeout),
/// composed at construction time rather than baked into the provider
/// itself — the same decorator shape `LlmAnalysisAgent` uses for
/// `LlmPipeline`.
pub struct ResilientEmbeddingProvider {
    inner: Arc<dyn EmbeddingProvider>,
    pipeline: NamedPipeline,
    per_attempt_timeout: Duration,
}

impl ResilientEmbeddingProvider {
    /// Wraps `inner`, routing every call through `pipeline` bounded by
    /// `per_attempt_timeout`.
    #[must_use]
    pub fn new(inner: Arc<dyn EmbeddingProvider>, pipeline: NamedPipeline, per_attempt_timeout: Duration) -> Self {
        Self { inner, pipeline, per_attempt_timeout }
    }
}

#[async_trait]
impl EmbeddingProvider for ResilientEmbeddingProvider {
    async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        let inner = Arc::clone(&self.inner);
        let text = text.to_string();
        self.pipeline.run(self.per_attempt_timeout, || {
            let inner = Arc::clone(&inner);
            let text = text.clone();
            async move { inner.generate(&text).await }
        }).await
    }

    async fn generate_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let inner = Arc::clone(&self.inner);
        let texts = texts.to_vec();
        self.pipeline.run(self.per_attempt_timeout, || {
            let inner = Arc::clone(&inner);
            let texts = texts.clone();
            async move { inner.generate_batch(&texts).await }
        }).await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use warden_domain::error::Error;
    use warden_infrastructure::resilience::{CircuitBreakerSettings, PipelineSettings, RetrySettings};

    use super::*;

    struct FlakyOnceProvider {
        calls: AtomicU32,
    }

    #[async_trait]
    impl EmbeddingProvider for FlakyOnceProvider {
        async fn generate(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        async fn generate_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(Error::external_unavailable("transient embedding failure"));
            }
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimension(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "flaky-test-provider"
        }
    }

    fn settings() -> PipelineSettings {
        PipelineSettings {
            retry: RetrySettings {
                max_attempts: 3,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(5),
                backoff_multiplier: 2.0,
                jitter_fraction: 0.0,
            },
            breaker: CircuitBreakerSettings { failure_threshold: 5, open_duration: Duration::from_secs(60) },
        }
    }

    #[tokio::test]
    async fn retries_a_transient_failure_then_succeeds() {
        let inner = Arc::new(FlakyOnceProvider { calls: AtomicU32::new(0) });
        let provider = ResilientEmbeddingProvider::new(
            inner,
            NamedPipeline::new("EmbeddingPipeline", settings()),
            Duration::from_secs(5),
        );

        let vectors = provider.generate_batch(&["one".to_string()]).await.unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0]]);
    }
}
