//! Abstract capability interfaces (§6). Resilience, rate-limiting, and
//! logging wrap these at construction time; implementations never
//! subclass or decorate across crate boundaries.

mod agent;
mod blob_store;
mod checkpoint_store;
mod chunker;
mod concurrency;
mod embedder;
mod job_queue;
mod llm_provider;
mod memory;
mod progress;
mod repositories;
mod tokenizer;
mod vector_store;
mod watchdog;

pub use agent::{AgentGuardrails, AnalysisAgent};
pub use blob_store::{BlobStore, ByteStream};
pub use checkpoint_store::CheckpointStore;
pub use chunker::{ChunkerOptions, SourceChunker};
pub use concurrency::{ConcurrencyLimiter, SlotGuard, SlotKind};
pub use embedder::EmbeddingProvider;
pub use job_queue::JobQueue;
pub use llm_provider::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider, StreamCallback};
pub use memory::MemoryMonitor;
pub use progress::{JobCompletion, PartialFinding, ProgressChannel, ProgressEvent, ProgressUpdate};
pub use repositories::{ChunkRepository, FindingRepository, ProjectRepository, ReportRepository};
pub use tokenizer::Tokenizer;
pub use vector_store::{VectorQuery, VectorQueryResult, VectorStore};
pub use watchdog::Watchdog;
