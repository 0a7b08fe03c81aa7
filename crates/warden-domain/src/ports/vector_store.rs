use async_trait::async_trait;

use crate::entities::{ChunkHash, ProjectId, VectorEntry};
use crate::error::Result;

/// Parameters for an ANN query (§4.5).
#[derive(Debug, Clone)]
pub struct VectorQuery {
    /// Query vector, expected L2-normalized like stored vectors.
    pub vector: Vec<f32>,
    /// Maximum results to return.
    pub top_k: usize,
    /// When set, restrict results to this project (authoritative scoping).
    pub project_id: Option<ProjectId>,
}

/// One scored hit from a [`VectorStore::query`] call.
#[derive(Debug, Clone)]
pub struct VectorQueryResult {
    /// The matched entry.
    pub entry: VectorEntry,
    /// Cosine similarity in `[-1, 1]`; results below `MinSimilarityScore`
    /// may still be returned, callers filter.
    pub similarity: f32,
}

/// Vector upsert/ANN-query operations, scoped by project (§4.5).
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Upserts one vector entry. Writing the same `ChunkHash` overwrites
    /// prior content and metadata.
    ///
    /// # Errors
    /// Returns an error for provider failures.
    async fn index_vector(&self, entry: VectorEntry) -> Result<()>;

    /// Upserts a batch of vector entries.
    ///
    /// # Errors
    /// Returns an error for provider failures.
    async fn index_vectors_batch(&self, entries: Vec<VectorEntry>) -> Result<()>;

    /// Runs an ANN query, returning at most `query.top_k` hits sorted by
    /// descending similarity.
    ///
    /// # Errors
    /// Returns an error for provider failures.
    async fn query(&self, query: VectorQuery) -> Result<Vec<VectorQueryResult>>;

    /// Deletes every vector belonging to `project_id`.
    ///
    /// # Errors
    /// Returns an error for provider failures.
    async fn delete_by_project(&self, project_id: ProjectId) -> Result<()>;

    /// Deletes a single entry by key.
    ///
    /// # Errors
    /// Returns an error for provider failures.
    async fn delete(&self, key: ChunkHash) -> Result<()>;

    /// Counts entries, optionally scoped to one project.
    ///
    /// # Errors
    /// Returns an error for provider failures.
    async fn count(&self, project_id: Option<ProjectId>) -> Result<u64>;
}
