use std::collections::BTreeMap;

use crate::entities::{Chunk, ProjectId};
use crate::error::Result;

/// Options controlling a chunking pass, threaded through from `Rag`
/// configuration.
#[derive(Debug, Clone, Copy)]
pub struct ChunkerOptions {
    /// Maximum tokens per chunk.
    pub max_chunk_tokens: u32,
    /// Token overlap between adjacent sliding-window chunks.
    pub overlap_tokens: u32,
    /// Chunks below this token count are dropped.
    pub min_chunk_tokens: u32,
    /// Whether to attempt language-aware semantic splitting before falling
    /// back to sliding-window.
    pub use_semantic_splitting: bool,
    /// Whether to retain chunk text in the returned `Chunk::content`.
    pub store_chunk_text: bool,
}

/// Splits file contents into deterministic, token-bounded chunks (§4.2).
///
/// Implementations must be deterministic: identical `(project_id, files,
/// options)` must produce byte-identical `ChunkHash` sequences in the same
/// order across calls and across process restarts.
pub trait SourceChunker: Send + Sync {
    /// Chunks every file in `files` (path -> content), skipping empty
    /// files and dropping any resulting chunk under
    /// `options.min_chunk_tokens`.
    ///
    /// # Errors
    /// Returns an error if chunking fails for a reason other than a
    /// per-file condition the router should have already screened out
    /// (e.g. an internal tokenizer failure).
    fn chunk_files(
        &self,
        project_id: ProjectId,
        files: &BTreeMap<String, String>,
        options: ChunkerOptions,
    ) -> Result<Vec<Chunk>>;
}
