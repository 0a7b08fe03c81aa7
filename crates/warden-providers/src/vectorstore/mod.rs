//! Vector Store (§4.5): a project-scoped, in-process ANN index backed by
//! `dashmap`. Exact cosine-similarity scan rather than an approximate
//! index; adequate at the project/job scale this system targets and
//! avoids depending on an external vector database service.

mod resilient;

use std::collections::HashSet;

use async_trait::async_trait;
use dashmap::DashMap;
use warden_domain::entities::{ChunkHash, ProjectId, VectorEntry};
use warden_domain::error::Result;
use warden_domain::ports::{VectorQuery, VectorQueryResult, VectorStore};

pub use resilient::ResilientVectorStore;

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}

/// `dashmap`-backed [`VectorStore`]. Entries are keyed by [`ChunkHash`];
/// a secondary per-project index avoids a full scan for project-scoped
/// deletes and counts.
#[derive(Default)]
pub struct InMemoryVectorStore {
    entries: DashMap<ChunkHash, VectorEntry>,
    by_project: DashMap<ProjectId, HashSet<ChunkHash>>,
}

impl InMemoryVectorStore {
    /// Builds an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_one(&self, entry: VectorEntry) {
        self.by_project.entry(entry.project_id).or_default().insert(entry.key);
        self.entries.insert(entry.key, entry);
    }

    fn remove_one(&self, key: ChunkHash) {
        if let Some((_, entry)) = self.entries.remove(&key) {
            if let Some(mut keys) = self.by_project.get_mut(&entry.project_id) {
                keys.remove(&key);
            }
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn index_vector(&self, entry: VectorEntry) -> Result<()> {
        self.insert_one(entry);
        Ok(())
    }

    async fn index_vectors_batch(&self, entries: Vec<VectorEntry>) -> Result<()> {
        for entry in entries {
            self.insert_one(entry);
        }
        Ok(())
    }

    async fn query(&self, query: VectorQuery) -> Result<Vec<VectorQueryResult>> {
        let mut scored: Vec<VectorQueryResult> = self
            .entries
            .iter()
            .filter(|entry| query.project_id.is_none_or(|project_id| entry.project_id == project_id))
            .map(|entry| VectorQueryResult {
                entry: entry.value().clone(),
                similarity: cosine_similarity(&query.vector, &entry.value().vector),
            })
            .collect();

        scored.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(query.top_k);
        Ok(scored)
    }

    async fn delete_by_project(&self, project_id: ProjectId) -> Result<()> {
        if let Some((_, keys)) = self.by_project.remove(&project_id) {
            for key in keys {
                self.entries.remove(&key);
            }
        }
        Ok(())
    }

    async fn delete(&self, key: ChunkHash) -> Result<()> {
        self.remove_one(key);
        Ok(())
    }

    async fn count(&self, project_id: Option<ProjectId>) -> Result<u64> {
        match project_id {
            Some(project_id) => Ok(self.by_project.get(&project_id).map_or(0, |keys| keys.len() as u64)),
            None => Ok(self.entries.len() as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_domain::entities::ChunkHash;

    fn entry(project_id: ProjectId, file_path: &str, vector: Vec<f32>) -> VectorEntry {
        VectorEntry {
            key: ChunkHash::compute(project_id, file_path, "content", 1, 1),
            vector,
            project_id,
            file_path: file_path.to_string(),
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
    async fn query_returns_top_k_sorted_by_similarity() {
        let store = InMemoryVectorStore::new();
        let project_id = ProjectId::new();
        store.index_vector(entry(project_id, "a.rs", vec![1.0, 0.0])).await.unwrap();
        store.index_vector(entry(project_id, "b.rs", vec![0.0, 1.0])).await.unwrap();
        store.index_vector(entry(project_id, "c.rs", vec![0.9, 0.1])).await.unwrap();

        let results = store
            .query(VectorQuery {
                vector: vec![1.0, 0.0],
                top_k: 2,
                project_id: None,
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].entry.file_path, "a.rs");
        assert_eq!(results[1].entry.file_path, "c.rs");
    }

    #[tokio::test]
    async fn query_respects_project_scoping() {
        let store = InMemoryVectorStore::new();
        let project_a = ProjectId::new();
        let project_b = ProjectId::new();
        store.index_vector(entry(project_a, "a.rs", vec![1.0, 0.0])).await.unwrap();
        store.index_vector(entry(project_b, "b.rs", vec![1.0, 0.0])).await.unwrap();

        let results = store
            .query(VectorQuery {
                vector: vec![1.0, 0.0],
                top_k: 10,
                project_id: Some(project_a),
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.file_path, "a.rs");
    }

    #[tokio::test]
    async fn delete_by_project_removes_only_that_project() {
        let store = InMemoryVectorStore::new();
        let project_a = ProjectId::new();
        let project_b = ProjectId::new();
        store.index_vector(entry(project_a, "a.rs", vec![1.0, 0.0])).await.unwrap();
        store.index_vector(entry(project_b, "b.rs", vec![1.0, 0.0])).await.unwrap();

        store.delete_by_project(project_a).await.unwrap();

        assert_eq!(store.count(Some(project_a)).await.unwrap(), 0);
        assert_eq!(store.count(Some(project_b)).await.unwrap(), 1);
        assert_eq!(store.count(None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_removes_single_entry() {
        let store = InMemoryVectorStore::new();
        let project_id = ProjectId::new();
        let e = entry(project_id, "a.rs", vec![1.0, 0.0]);
        let key = e.key;
        store.index_vector(e).await.unwrap();
        store.delete(key).await.unwrap();
        assert_eq!(store.count(None).await.unwrap(), 0);
    }
}
