use sha2::{Digest, Sha256};
use warden_domain::entities::{Chunk, ChunkHash, ProjectId, SemanticType};
use warden_domain::ports::{ChunkerOptions, Tokenizer};

use super::sliding_window::sliding_window_segments;

pub(super) fn text_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[allow(clippy::too_many_arguments)]
pub(super) fn build_chunk(
    project_id: ProjectId,
    file_path: &str,
    text: &str,
    start_line: u32,
    end_line: u32,
    token_count: u32,
    language: &str,
    semantic_type: Option<SemanticType>,
    semantic_name: Option<String>,
    chunk_index: u32,
    total_chunks: u32,
    store_text: bool,
) -> Chunk {
    Chunk {
        chunk_hash: ChunkHash::compute(project_id, file_path, text, start_line, end_line),
        project_id,
        file_path: file_path.to_string(),
        start_line,
        end_line,
        token_count,
        language: language.to_string(),
        text_hash: text_hash(text),
        content: store_text.then(|| text.to_string()),
        semantic_type,
        semantic_name,
        chunk_index,
        total_chunks,
    }
}

#[allow(clippy::too_many_arguments)]
pub(super) fn emit_sliding_window(
    chunks: &mut Vec<Chunk>,
    project_id: ProjectId,
    file_path: &str,
    text: &str,
    absolute_start_line: u32,
    tokenizer: &dyn Tokenizer,
    options: ChunkerOptions,
    language: &str,
    semantic_type: Option<SemanticType>,
    semantic_name: Option<String>,
) {
    let segments = sliding_window_segments(text, tokenizer, options.max_chunk_tokens, options.overlap_tokens);
    let total = segments.len() as u32;
    for (idx, (segment_text, rel_start, rel_end)) in segments.into_iter().enumerate() {
        if segment_text.trim().is_empty() {
            continue;
        }
        let token_count = tokenizer.count_tokens(&segment_text) as u32;
        if token_count < options.min_chunk_tokens {
            continue;
        }
        let start_line = absolute_start_line + rel_start - 1;
        let end_line = absolute_start_line + rel_end - 1;
        chunks.push(build_chunk(
            project_id,
            file_path,
            &segment_text,
            start_line,
            end_line,
            token_count,
            language,
            semantic_type,
            semantic_name.clone(),
            idx as u32,
            total,
            options.store_chunk_text,
        ));
    }
}
