//! Retrieval Orchestrator (§4.10): the durable chunk -> embed -> index
//! pipeline, batched to bound peak memory and checkpointed for resume.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use warden_domain::entities::{
    CheckpointPhase, Chunk, JobCheckpoint, ProjectId, VectorEntry,
};
use warden_domain::error::{Error, Result};
use warden_domain::ports::{
    ChunkRepository, ChunkerOptions, CheckpointStore, ConcurrencyLimiter, EmbeddingProvider,
    MemoryMonitor, ProgressChannel, ProgressEvent, ProgressUpdate, SlotKind, SourceChunker,
    VectorStore, Watchdog,
};

/// Files-in-memory batch size; chosen so the orchestrator never holds more
/// than one batch's content in memory at once.
const DEFAULT_FILE_BATCH_SIZE: usize = 50;

/// Sub-batch size for embedding calls (`EmbeddingBatchSize`, §4.3 default).
const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 16;

/// Aggregate result of an index run (§4.10).
#[derive(Debug, Clone, Default)]
pub struct IndexResult {
    /// Files successfully processed.
    pub files_processed: u64,
    /// Chunks created (post-dedup).
    pub chunks_created: u64,
    /// Embedding vectors generated.
    pub embeddings_generated: u64,
    /// Per-sub-batch errors recorded without aborting the whole index.
    pub errors: Vec<String>,
}

/// Durable chunk -> embed -> index pipeline.
pub struct RetrievalOrchestrator {
    chunker: Arc<dyn SourceChunker>,
    embedder: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    chunk_repo: Arc<dyn ChunkRepository>,
    checkpoint_store: Arc<dyn CheckpointStore>,
    limiter: Arc<dyn ConcurrencyLimiter>,
    memory: Arc<dyn MemoryMonitor>,
    watchdog: Arc<dyn Watchdog>,
    progress: Arc<dyn ProgressChannel>,
    chunker_options: ChunkerOptions,
    embedding_batch_size: usize,
    file_batch_size: usize,
}

impl RetrievalOrchestrator {
    /// Builds an orchestrator from its injected ports.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        chunker: Arc<dyn SourceChunker>,
        embedder: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
        chunk_repo: Arc<dyn ChunkRepository>,
        checkpoint_store: Arc<dyn CheckpointStore>,
        limiter: Arc<dyn ConcurrencyLimiter>,
        memory: Arc<dyn MemoryMonitor>,
        watchdog: Arc<dyn Watchdog>,
        progress: Arc<dyn ProgressChannel>,
        chunker_options: ChunkerOptions,
    ) -> Self {
        Self {
            chunker,
            embedder,
            vector_store,
            chunk_repo,
            checkpoint_store,
            limiter,
            memory,
            watchdog,
            progress,
            chunker_options,
            embedding_batch_size: DEFAULT_EMBEDDING_BATCH_SIZE,
            file_batch_size: DEFAULT_FILE_BATCH_SIZE,
        }
    }

    fn heartbeat(&self, project_id: ProjectId, phase: &str) {
        self.watchdog.heartbeat(project_id, phase);
    }

    fn emit_progress(&self, project_id: ProjectId, phase: &str, processed: u64, total: u64, current_file: Option<String>) {
        let percent = if total == 0 { 100.0 } else { (processed as f32 / total as f32) * 100.0 };
        self.progress.publish(ProgressEvent::Progress(ProgressUpdate {
            project_id,
            phase: phase.to_string(),
            progress_percent: percent,
            current_file,
            files_processed: processed,
            total_files: total,
        }));
    }

    /// Entry point (a) from §4.10: given a file map already held in
    /// memory, process it in batches exactly as
    /// [`index_project_streaming`](Self::index_project_streaming) does.
    /// Callers that already have file content in hand (e.g. a small
    /// preflight-estimated project) use this; everything else should
    /// prefer the streaming entry point so file content is never
    /// materialized ahead of its batch.
    ///
    /// # Errors
    /// See [`index_project_streaming`](Self::index_project_streaming).
    pub async fn index_project(
        &self,
        project_id: ProjectId,
        files: &BTreeMap<String, String>,
        batch_total_files: u64,
        cancellation: &CancellationToken,
    ) -> Result<IndexResult> {
        let file_paths: Vec<String> = files.keys().cloned().collect();
        self.run_batches(project_id, batch_total_files, cancellation, &file_paths, |path| {
            files.get(path).cloned()
        })
        .await
    }

    /// Entry point (b) from §4.10: streams `file_paths` (relative to
    /// `working_directory`) off disk one file-batch at a time, so the
    /// orchestrator never holds more than one batch's content in memory —
    /// the whole tree is never loaded at once. Dedups by `(project_id,
    /// chunk_hash)`, embeds under the Embedding slot and resilience
    /// pipeline, persists chunk rows, and upserts vectors — transacted per
    /// chunk so cancellation never leaves a half-upserted vector.
    ///
    /// # Errors
    /// Returns [`Error::MemoryPause`] if the memory monitor's pause
    /// threshold is reached between batches, or propagates a fatal
    /// storage/provider error.
    pub async fn index_project_streaming(
        &self,
        project_id: ProjectId,
        working_directory: &Path,
        file_paths: &[String],
        batch_total_files: u64,
        cancellation: &CancellationToken,
    ) -> Result<IndexResult> {
        self.run_batches(project_id, batch_total_files, cancellation, file_paths, |path| {
            std::fs::read_to_string(working_directory.join(path)).ok()
        })
        .await
    }

    /// Shared per-batch core for both entry points: `read_file` is called
    /// lazily, once per path, only as each batch is assembled — never for
    /// the whole file list up front.
    async fn run_batches(
        &self,
        project_id: ProjectId,
        batch_total_files: u64,
        cancellation: &CancellationToken,
        file_paths: &[String],
        read_file: impl Fn(&str) -> Option<String>,
    ) -> Result<IndexResult> {
        let mut result = IndexResult::default();
        let mut seen: BTreeSet<String> = BTreeSet::new();
        let batch_count = file_paths.len().div_ceil(self.file_batch_size).max(1);

        for (batch_index, path_chunk) in file_paths.chunks(self.file_batch_size).enumerate() {
            if cancellation.is_cancelled() {
                return Err(Error::Cancelled {
                    reason: "job cancellation requested".into(),
                });
            }

            self.heartbeat(project_id, &format!("Batch {}/{batch_count}: Loading files", batch_index + 1));
            let mut batch_files = BTreeMap::new();
            for path in path_chunk {
                if let Some(content) = read_file(path) {
                    batch_files.insert(path.clone(), content);
                }
            }

            self.heartbeat(project_id, &format!("Batch {}/{batch_count}: Chunking", batch_index + 1));
            let mut chunks = self.chunker.chunk_files(project_id, &batch_files, self.chunker_options)?;

            chunks.retain(|c| seen.insert(c.chunk_hash.to_hex()));
            let hashes: Vec<_> = chunks.iter().map(|c| c.chunk_hash).collect();
            let existing = self.chunk_repo.existing_hashes(project_id, &hashes).await?;
            let existing_set: BTreeSet<_> = existing.into_iter().collect();
            chunks.retain(|c| !existing_set.contains(&c.chunk_hash));

            let mut embedded_count = 0u64;
            for (sub_index, sub_batch) in chunks.chunks(self.embedding_batch_size).enumerate() {
                if cancellation.is_cancelled() {
                    return Err(Error::Cancelled {
                        reason: "job cancellation requested mid-batch".into(),
                    });
                }
                self.heartbeat(
                    project_id,
                    &format!("Batch {}/{batch_count}: Embeddings {sub_index}", batch_index + 1),
                );

                let guard = tokio::select! {
                    guard = self.limiter.acquire(SlotKind::Embedding) => guard?,
                    () = cancellation.cancelled() => {
                        return Err(Error::Cancelled {
                            reason: "job cancellation requested while waiting for an embedding slot".into(),
                        });
                    }
                };
                let texts: Vec<String> = sub_batch
                    .iter()
                    .map(|c| c.content.clone().unwrap_or_default())
                    .collect();
                let vectors = match self.embedder.generate_batch(&texts).await {
                    Ok(v) => v,
                    Err(e) => {
                        result.errors.push(format!("embedding sub-batch {sub_index} failed: {e}"));
                        drop(guard);
                        continue;
                    }
                };
                drop(guard);

                for (chunk, vector) in sub_batch.iter().zip(vectors.into_iter()) {
                    let entry = VectorEntry {
                        key: chunk.chunk_hash,
                        vector,
                        project_id,
                        file_path: chunk.file_path.clone(),
                        start_line: chunk.start_line,
                        end_line: chunk.end_line,
                        language: chunk.language.clone(),
                        semantic_type: chunk.semantic_type,
                        semantic_name: chunk.semantic_name.clone(),
                        chunk_index: chunk.chunk_index,
                        total_chunks: chunk.total_chunks,
                    };
                    self.chunk_repo.save_batch(std::slice::from_ref(chunk)).await?;
                    if let Err(e) = self.vector_store.index_vector(entry).await {
                        // Compensate: the chunk row must not outlive its vector, or the
                        // next retry's existing_hashes check would hide it forever.
                        self.chunk_repo.delete_chunk(project_id, chunk.chunk_hash).await?;
                        return Err(e);
                    }
                    embedded_count += 1;
                }
            }

            self.heartbeat(project_id, &format!("Batch {}/{batch_count}: Saving DB", batch_index + 1));
            self.heartbeat(project_id, &format!("Batch {}/{batch_count}: Vector indexing", batch_index + 1));

            result.files_processed += batch_files.len() as u64;
            result.chunks_created += chunks.len() as u64;
            result.embeddings_generated += embedded_count;

            self.emit_progress(project_id, "Indexing", result.files_processed, batch_total_files, None);

            // batch working set goes out of scope here, bounding peak memory
            drop(batch_files);
            self.memory.request_gc_if_needed();

            if self.memory.should_pause_processing() {
                self.memory.force_aggressive_gc();
                if let Some(mut checkpoint) = self.checkpoint_store.get(project_id).await? {
                    checkpoint.advance_phase(CheckpointPhase::Embedding).ok();
                    checkpoint.files_processed = result.files_processed;
                    checkpoint.chunks_indexed = result.chunks_created;
                    checkpoint.embeddings_created = result.embeddings_generated;
                    checkpoint.last_processed_file_index = ((batch_index + 1) * self.file_batch_size) as u64;
                    self.checkpoint_store.update(&checkpoint).await?;
                }
                warn!(project_id = %project_id, "pausing on resource pressure");
                return Err(Error::MemoryPause {
                    reason: "memory monitor pause threshold reached".into(),
                });
            }
        }

        info!(project_id = %project_id, files = result.files_processed, chunks = result.chunks_created, "index run complete");
        Ok(result)
    }

    /// Builds (or updates) a [`JobCheckpoint`] reflecting `result` at the
    /// `Indexing` phase, for callers that want to persist progress
    /// between pipeline stages.
    #[must_use]
    pub fn checkpoint_for(project_id: ProjectId, result: &IndexResult) -> JobCheckpoint {
        let mut cp = JobCheckpoint::new(project_id);
        cp.phase = CheckpointPhase::Indexing;
        cp.files_processed = result.files_processed;
        cp.chunks_indexed = result.chunks_created;
        cp.embeddings_created = result.embeddings_generated;
        cp.last_checkpoint_at = Utc::now();
        cp
    }
}
