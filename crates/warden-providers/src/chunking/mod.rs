//! Chunker (§4.2): boundary-aware splitting via `tree-sitter` grammars,
//! falling back to a deterministic sliding window. Grounded on the
//! enrichment repo's chunking pipeline for the semantic/fallback split,
//! generalized here to the spec's exact option set.

mod common;
mod semantic;
mod sliding_window;

use std::collections::BTreeMap;
use std::sync::Arc;

use warden_domain::entities::{Chunk, ProjectId};
use warden_domain::error::Result;
use warden_domain::ports::{ChunkerOptions, SourceChunker, Tokenizer};

use common::emit_sliding_window;
use semantic::chunk_file_semantic;

fn detected_language(file_path: &str) -> &'static str {
    match file_path.rsplit('.').next().unwrap_or("") {
        "rs" => "rust",
        "py" => "python",
        "js" | "jsx" | "mjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "go" => "go",
        "java" => "java",
        _ => "text",
    }
}

/// Chunks files via tree-sitter semantic splitting when
/// `options.use_semantic_splitting` and a grammar matches the file
/// extension, otherwise a pure sliding window over the whole file.
pub struct TreeSitterChunker {
    tokenizer: Arc<dyn Tokenizer>,
}

impl TreeSitterChunker {
    /// Builds a chunker using `tokenizer` for all token-counting decisions.
    #[must_use]
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self { tokenizer }
    }

    fn chunk_one_file(&self, project_id: ProjectId, file_path: &str, content: &str, options: ChunkerOptions) -> Result<Vec<Chunk>> {
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        if options.use_semantic_splitting {
            if let Some(chunks) = chunk_file_semantic(project_id, file_path, content, self.tokenizer.as_ref(), options)? {
                return Ok(chunks);
            }
        }

        let mut chunks = Vec::new();
        emit_sliding_window(
            &mut chunks,
            project_id,
            file_path,
            content,
            1,
            self.tokenizer.as_ref(),
            options,
            detected_language(file_path),
            None,
            None,
        );
        Ok(chunks)
    }
}

impl SourceChunker for TreeSitterChunker {
    fn chunk_files(&self, project_id: ProjectId, files: &BTreeMap<String, String>, options: ChunkerOptions) -> Result<Vec<Chunk>> {
        let mut all_chunks = Vec::new();
        for (file_path, content) in files {
            all_chunks.extend(self.chunk_one_file(project_id, file_path, content, options)?);
        }
        Ok(all_chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::HeuristicTokenizer;

    fn options() -> ChunkerOptions {
        ChunkerOptions {
            max_chunk_tokens: 100,
            overlap_tokens: 10,
            min_chunk_tokens: 1,
            use_semantic_splitting: true,
            store_chunk_text: true,
        }
    }

    fn chunker() -> TreeSitterChunker {
        TreeSitterChunker::new(Arc::new(HeuristicTokenizer::new()))
    }

    #[test]
    fn empty_file_is_skipped() {
        let mut files = BTreeMap::new();
        files.insert("empty.rs".to_string(), "   \n".to_string());
        let chunks = chunker().chunk_files(ProjectId::new(), &files, options()).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn identical_inputs_produce_identical_hash_sequences() {
        let mut files = BTreeMap::new();
        files.insert("a.rs".to_string(), "fn a() {}\nfn b() {}\n".to_string());
        let project_id = ProjectId::new();

        let first = chunker().chunk_files(project_id, &files, options()).unwrap();
        let second = chunker().chunk_files(project_id, &files, options()).unwrap();

        let first_hashes: Vec<_> = first.iter().map(|c| c.chunk_hash).collect();
        let second_hashes: Vec<_> = second.iter().map(|c| c.chunk_hash).collect();
        assert_eq!(first_hashes, second_hashes);
    }

    #[test]
    fn unrecognized_extension_falls_back_to_sliding_window() {
        let mut files = BTreeMap::new();
        files.insert("readme.md".to_string(), "just some plain text content here".to_string());
        let chunks = chunker().chunk_files(ProjectId::new(), &files, options()).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].language, "text");
    }

    #[test]
    fn well_formed_chunks_respect_token_and_line_invariants() {
        let mut files = BTreeMap::new();
        files.insert(
            "big.rs".to_string(),
            (0..50).map(|i| format!("fn f{i}() {{ let x = {i}; }}")).collect::<Vec<_>>().join("\n"),
        );
        let chunks = chunker().chunk_files(ProjectId::new(), &files, options()).unwrap();
        for chunk in &chunks {
            assert!(chunk.is_well_formed(options().max_chunk_tokens, 5));
        }
    }
}
