use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use warden_domain::entities::{ChunkHash, ProjectId, VectorEntry};
use warden_domain::error::Result;
use warden_domain::ports::{VectorQuery, VectorQueryResult, VectorStore};
use warden_infrastructure::resilience::NamedPipeline;

/// Wraps a [`VectorStore`] with the `VectorStorePipeline` (§4.7: higher
/// retry count for network flaps, 30s per-op timeout), composed at
/// construction time rather than baked into the store itself.
pub struct ResilientVectorStore {
    inner: Arc<dyn VectorStore>,
    pipeline: NamedPipeline,
    per_attempt_timeout: Duration,
}

impl ResilientVectorStore {
    /// Wraps `inner`, routing every call through `pipeline` bounded by
    /// `per_attempt_timeout`.
    #[must_use]
    pub fn new(inner: Arc<dyn VectorStore>, pipeline: NamedPipeline, per_attempt_timeout: Duration) -> Self {
        Self { inner, pipeline, per_attempt_timeout }
    }
}

#[async_trait]
impl VectorStore for ResilientVectorStore {
    async fn index_vector(&self, entry: VectorEntry) -> Result<()> {
        let inner = Arc::clone(&self.inner);
        self.pipeline.run(self.per_attempt_timeout, || {
            let inner = Arc::clone(&inner);
            let entry = entry.clone();
            async move { inner.index_vector(entry).await }
        }).await
    }

    async fn index_vectors_batch(&self, entries: Vec<VectorEntry>) -> Result<()> {
        let inner = Arc::clone(&self.inner);
        self.pipeline.run(self.per_attempt_timeout, || {
            let inner = Arc::clone(&inner);
            let entries = entries.clone();
            async move { inner.index_vectors_batch(entries).await }
        }).await
    }

    async fn query(&self, query: VectorQuery) -> Result<Vec<VectorQueryResult>> {
        let inner = Arc::clone(&self.inner);
        self.pipeline.run(self.per_attempt_timeout, || {
            let inner = Arc::clone(&inner);
            let query = query.clone();
            async move { inner.query(query).await }
        }).await
    }

    async fn delete_by_project(&self, project_id: ProjectId) -> Result<()> {
        let inner = Arc::clone(&self.inner);
        self.pipeline.run(self.per_attempt_timeout, || {
            let inner = Arc::clone(&inner);
            async move { inner.delete_by_project(project_id).await }
        }).await
    }

    async fn delete(&self, key: ChunkHash) -> Result<()> {
        let inner = Arc::clone(&self.inner);
        self.pipeline.run(self.per_attempt_timeout, || {
            let inner = Arc::clone(&inner);
            async move { inner.delete(key).await }
        }).await
    }

    async fn count(&self, project_id: Option<ProjectId>) -> Result<u64> {
        let inner = Arc::clone(&self.inner);
        self.pipeline.run(self.per_attempt_timeout, || {
            let inner = Arc::clone(&inner);
            async move { inner.count(project_id).await }
        }).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use warden_infrastructure::resilience::{CircuitBreakerSettings, PipelineSettings, RetrySettings};

    use super::super::InMemoryVectorStore;
    use super::*;

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

    fn entry(project_id: ProjectId) -> VectorEntry {
        VectorEntry {
            key: ChunkHash::compute(project_id, "a.rs", "content", 1, 1),
            vector: vec![1.0, 0.0],
            project_id,
            file_path: "a.rs".to_string(),
            start_line: 1,
            end_line: 1,
            language: "rust".to_string(),
            semantic_type: None,
            semantic_name: None,
            chunk_index: 0,
            total_chunks: 1,
        }
    }

    #[tokio::test]
    async fn delegates_successful_calls_to_the_inner_store() {
        let inner = Arc::new(InMemoryVectorStore::new());
        let store = ResilientVectorStore::new(
            inner,
            NamedPipeline::new("VectorStorePipeline", settings()),
            Duration::from_secs(30),
        );
        let project_id = ProjectId::new();

        store.index_vector(entry(project_id)).await.unwrap();
        assert_eq!(store.count(Some(project_id)).await.unwrap(), 1);
    }
}
