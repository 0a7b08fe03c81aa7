use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::project::ProjectId;

/// Deterministic hash over `(ProjectId, FilePath, chunk content, start line,
/// end line)`, used as the chunk's stable identity and vector-store key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkHash(pub [u8; 32]);

impl ChunkHash {
    /// Computes the hash per the Chunker's deterministic-hashing contract.
    #[must_use]
    pub fn compute(project_id: ProjectId, file_path: &str, content: &str, start_line: u32, end_line: u32) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(project_id.0.as_bytes());
        hasher.update(file_path.as_bytes());
        hasher.update(content.as_bytes());
        hasher.update(start_line.to_le_bytes());
        hasher.update(end_line.to_le_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Lowercase hex rendering, used as the on-disk/wire key.
    #[must_use]
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for ChunkHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Semantic unit kind a chunk may be stamped with when produced by
/// boundary-aware splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SemanticType {
    /// A namespace or module declaration.
    Namespace,
    /// A class declaration.
    Class,
    /// An interface/trait declaration.
    Interface,
    /// A record/data-class declaration.
    Record,
    /// A struct declaration.
    Struct,
    /// An enum declaration.
    Enum,
    /// A method or free function.
    Method,
    /// Any other recognized unit.
    Other,
}

/// A semantically meaningful, token-bounded slice of one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Deterministic identity; unique together with `project_id`.
    pub chunk_hash: ChunkHash,
    /// Owning project.
    pub project_id: ProjectId,
    /// Path of the source file, relative to the project root.
    pub file_path: String,
    /// First line covered by this chunk (1-based, inclusive).
    pub start_line: u32,
    /// Last line covered by this chunk (1-based, inclusive).
    pub end_line: u32,
    /// Token count as measured by the configured tokenizer.
    pub token_count: u32,
    /// Detected or configured source language.
    pub language: String,
    /// Hash of the raw chunk text, independent of `chunk_hash`'s line
    /// range component; used for cheap content-only comparisons.
    pub text_hash: String,
    /// Raw chunk text, retained only when `StoreChunkText` is enabled.
    pub content: Option<String>,
    /// Semantic unit kind, when produced by boundary-aware splitting.
    pub semantic_type: Option<SemanticType>,
    /// Name of the enclosing semantic unit (class/method name, etc.).
    pub semantic_name: Option<String>,
    /// Index of this chunk within its semantic unit (0-based).
    pub chunk_index: u32,
    /// Total chunk count for the enclosing semantic unit.
    pub total_chunks: u32,
}

impl Chunk {
    /// Validates the per-chunk invariants from the data model: a
    /// non-inverted line range and a bounded token count.
    #[must_use]
    pub fn is_well_formed(&self, max_chunk_tokens: u32, tolerance: u32) -> bool {
        self.start_line <= self.end_line && self.token_count <= max_chunk_tokens + tolerance
    }
}
