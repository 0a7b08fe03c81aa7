use serde::{Deserialize, Serialize};

use super::chunk::{ChunkHash, SemanticType};
use super::project::ProjectId;

/// One ANN record: a chunk's embedding plus the metadata needed for
/// project-scoped filtered search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorEntry {
    /// Key; equal to the source chunk's hash.
    pub key: ChunkHash,
    /// L2-normalized embedding vector.
    pub vector: Vec<f32>,
    /// Owning project, indexed for filtered search.
    pub project_id: ProjectId,
    /// Source file path.
    pub file_path: String,
    /// First line covered (1-based, inclusive).
    pub start_line: u32,
    /// Last line covered (1-based, inclusive).
    pub end_line: u32,
    /// Source language.
    pub language: String,
    /// Semantic unit kind, if any.
    pub semantic_type: Option<SemanticType>,
    /// Semantic unit name, if any.
    pub semantic_name: Option<String>,
    /// Index within the enclosing semantic unit.
    pub chunk_index: u32,
    /// Total chunk count for the enclosing semantic unit.
    pub total_chunks: u32,
}

impl VectorEntry {
    /// Magnitude of `self.vector`; used to assert the L2-normalization
    /// invariant (`|‖v‖ − 1| ≤ 1e-3`).
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        self.vector.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Whether `self.vector` is normalized within the spec's tolerance.
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        (self.magnitude() - 1.0).abs() <= 1e-3
    }
}
