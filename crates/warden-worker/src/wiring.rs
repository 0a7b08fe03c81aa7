//! Composition root: turns an [`AppConfig`] into a fully wired
//! [`JobConsumer`] by constructing every concrete adapter and injecting
//! it behind the port trait object the application layer expects.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::warn;
use warden_application::{AgentOrchestrator, JobConsumer, RetrievalOrchestrator};
use warden_domain::error::Result;
use warden_domain::ports::{AgentGuardrails, ChunkerOptions};
use warden_infrastructure::checkpoint::SqliteCheckpointStore;
use warden_infrastructure::concurrency::TokioConcurrencyLimiter;
use warden_infrastructure::config::AppConfig;
use warden_infrastructure::memory::SysinfoMemoryMonitor;
use warden_infrastructure::progress::BroadcastProgressChannel;
use warden_infrastructure::queue::InMemoryJobQueue;
use warden_infrastructure::repository::SqliteRepositories;
use warden_infrastructure::resilience::{CircuitBreakerSettings, NamedPipeline, PipelineSettings, RetrySettings};
use warden_infrastructure::watchdog::{BackgroundWatchdog, WatchdogSettings};
use warden_providers::blobstore::FilesystemBlobStore;
use warden_providers::chunking::TreeSitterChunker;
use warden_providers::embedding::{FastEmbedProvider, HashEmbeddingProvider, ResilientEmbeddingProvider};
use warden_providers::llm::{LlmAnalysisAgent, OpenAiLlmProvider};
use warden_providers::tokenizer::TiktokenTokenizer;
use warden_providers::vectorstore::{InMemoryVectorStore, ResilientVectorStore};

/// Fixed roster of agent identities this worker runs over every project.
/// `spec.md` §4.12 treats the roster as externally configured; this binary
/// ships the three reviewer personas the bundled system prompts target.
const AGENT_ROSTER: &[(&str, &str)] = &[
    (
        "security-agent",
        "You are a security reviewer. Find vulnerabilities, unsafe input handling, and secrets \
         committed to source. Respond only with JSON: \
         {\"findings\": [{\"category\": str, \"severity\": str, \"description\": str, \"explanation\": str}]}",
    ),
    (
        "correctness-agent",
        "You are a correctness reviewer. Find logic errors, off-by-one bugs, and unhandled edge \
         cases. Respond only with JSON: \
         {\"findings\": [{\"category\": str, \"severity\": str, \"description\": str, \"explanation\": str}]}",
    ),
    (
        "maintainability-agent",
        "You are a maintainability reviewer. Find overly complex code, missing error handling, and \
         unclear naming. Respond only with JSON: \
         {\"findings\": [{\"category\": str, \"severity\": str, \"description\": str, \"explanation\": str}]}",
    ),
];

fn pipeline_settings(config: &AppConfig) -> PipelineSettings {
    PipelineSettings {
        retry: RetrySettings {
            max_attempts: 3,
            base_delay: std::time::Duration::from_millis(200),
            max_delay: std::time::Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter_fraction: 0.2,
        },
        breaker: CircuitBreakerSettings {
            failure_threshold: 5,
            open_duration: std::time::Duration::from_secs(config.timeout_strategy.max_timeout_seconds as u64),
        },
    }
}

/// §4.7: "bounded retries; breaker B'/W'; total timeout 5 min."
fn embedding_pipeline_settings() -> PipelineSettings {
    PipelineSettings {
        retry: RetrySettings {
            max_attempts: 4,
            base_delay: std::time::Duration::from_millis(250),
            max_delay: std::time::Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter_fraction: 0.2,
        },
        breaker: CircuitBreakerSettings { failure_threshold: 5, open_duration: std::time::Duration::from_secs(30) },
    }
}

/// §4.7: "higher retry count (network flaps), per-op 30 s."
fn vector_store_pipeline_settings() -> PipelineSettings {
    PipelineSettings {
        retry: RetrySettings {
            max_attempts: 6,
            base_delay: std::time::Duration::from_millis(100),
            max_delay: std::time::Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter_fraction: 0.2,
        },
        breaker: CircuitBreakerSettings { failure_threshold: 8, open_duration: std::time::Duration::from_secs(15) },
    }
}

fn build_embedder() -> Arc<dyn warden_domain::ports::EmbeddingProvider> {
    match FastEmbedProvider::try_new_default() {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            warn!(error = %e, "fastembed model unavailable, falling back to the deterministic hash embedder");
            Arc::new(HashEmbeddingProvider::new(384))
        }
    }
}

/// Every wired adapter and orchestrator a worker process needs, plus the
/// background loops (`memory`/`watchdog`) it should drive on a timer.
pub struct AppContext {
    /// The fully wired consumer; `run()`'s main loop drives this.
    pub consumer: Arc<JobConsumer>,
    /// Shared in-process queue; the `submit` path enqueues onto this.
    pub queue: Arc<InMemoryJobQueue>,
    /// Project metadata store, used by `submit` to register new projects.
    pub repositories: Arc<SqliteRepositories>,
    /// Root directory under which each project's working tree lives.
    pub working_directory_root: PathBuf,
    /// Memory monitor, sampled periodically by the caller.
    pub memory: Arc<SysinfoMemoryMonitor>,
    /// Watchdog, scanned periodically by the caller.
    pub watchdog: Arc<BackgroundWatchdog>,
    /// Visibility timeout passed to every `dequeue` call.
    pub visibility_timeout_secs: u64,
}

/// Builds the full dependency graph described by `config`.
///
/// # Errors
/// Returns an error if the repository store cannot be reached/migrated,
/// or if an OpenAI API key is not available in the environment.
pub async fn build(config: &AppConfig, working_directory_root: PathBuf) -> Result<AppContext> {
    let repositories = Arc::new(SqliteRepositories::connect(&config.persistence.database_url, config.persistence.max_connections).await?);
    let checkpoint_store = Arc::new(
        SqliteCheckpointStore::connect(&config.persistence.database_url, config.persistence.max_connections).await?,
    );

    let queue = Arc::new(InMemoryJobQueue::new());
    let limiter = Arc::new(TokioConcurrencyLimiter::new(
        config.concurrency.embedding,
        config.concurrency.reasoning,
        config.concurrency.file_read,
    ));
    let memory = Arc::new(SysinfoMemoryMonitor::new(
        config.memory_management.max_worker_memory_mb,
        config.memory_management.warning_threshold_percent,
        config.memory_management.pause_threshold_percent,
    ));
    let watchdog = Arc::new(BackgroundWatchdog::new(WatchdogSettings {
        check_interval: std::time::Duration::from_secs(config.watchdog.check_interval_seconds),
        max_project_duration: std::time::Duration::from_secs(config.watchdog.max_project_duration_seconds),
        max_heartbeat_interval: std::time::Duration::from_secs(config.watchdog.max_heartbeat_interval_seconds),
        auto_cancel_stuck: config.watchdog.auto_cancel_stuck,
        stuck_detection_threshold: config.watchdog.stuck_detection_threshold,
    }));
    let progress = Arc::new(BroadcastProgressChannel::new());

    let tokenizer = Arc::new(TiktokenTokenizer::cl100k()?);
    let chunker = Arc::new(TreeSitterChunker::new(tokenizer));
    let embedder: Arc<dyn warden_domain::ports::EmbeddingProvider> = Arc::new(ResilientEmbeddingProvider::new(
        build_embedder(),
        NamedPipeline::new("EmbeddingPipeline", embedding_pipeline_settings()),
        std::time::Duration::from_secs(300),
    ));
    let vector_store: Arc<dyn warden_domain::ports::VectorStore> = Arc::new(ResilientVectorStore::new(
        Arc::new(InMemoryVectorStore::new()),
        NamedPipeline::new("VectorStorePipeline", vector_store_pipeline_settings()),
        std::time::Duration::from_secs(30),
    ));

    let chunker_options = ChunkerOptions {
        max_chunk_tokens: config.rag.chunk_size_tokens,
        overlap_tokens: config.rag.overlap_tokens,
        min_chunk_tokens: config.rag.min_chunk_tokens,
        use_semantic_splitting: true,
        store_chunk_text: true,
    };

    let retrieval = Arc::new(RetrievalOrchestrator::new(
        chunker,
        embedder,
        vector_store,
        repositories.clone(),
        checkpoint_store.clone(),
        limiter.clone(),
        memory.clone(),
        watchdog.clone(),
        progress.clone(),
        chunker_options,
    ));

    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
    let mut openai_config = async_openai::config::OpenAIConfig::new().with_api_key(api_key);
    if let Ok(base_url) = std::env::var("OPENAI_API_BASE") {
        openai_config = openai_config.with_api_base(base_url);
    }
    let llm: Arc<dyn warden_domain::ports::LlmProvider> = Arc::new(OpenAiLlmProvider::new(
        openai_config,
        "gpt-4o-mini",
        config.timeout_strategy.enable_graceful_degradation,
    ));
    let adaptive_timeout = warden_infrastructure::resilience::AdaptiveTimeout::new(config.timeout_strategy, config.use_adaptive_timeout);

    let agents: Vec<Arc<dyn warden_domain::ports::AnalysisAgent>> = AGENT_ROSTER
        .iter()
        .map(|(agent_type, system_prompt)| {
            let pipeline = NamedPipeline::new("LLMPipeline", pipeline_settings(config));
            Arc::new(LlmAnalysisAgent::new(
                *agent_type,
                *system_prompt,
                llm.clone(),
                pipeline,
                adaptive_timeout,
                4096,
                AgentGuardrails::default(),
            )) as Arc<dyn warden_domain::ports::AnalysisAgent>
        })
        .collect();

    let agent_orchestrator = Arc::new(AgentOrchestrator::new(
        agents,
        limiter,
        memory.clone(),
        checkpoint_store.clone(),
        repositories.clone(),
        repositories.clone(),
        progress.clone(),
    ));

    let consumer = Arc::new(JobConsumer::new(
        queue.clone(),
        repositories.clone(),
        checkpoint_store,
        retrieval,
        agent_orchestrator,
        watchdog.clone(),
        progress,
    ));

    std::fs::create_dir_all(&working_directory_root)
        .map_err(|e| warden_domain::Error::Fatal(format!("failed to create working directory root: {e}")))?;

    Ok(AppContext {
        consumer,
        queue,
        repositories,
        working_directory_root,
        memory,
        watchdog,
        visibility_timeout_secs: 300,
    })
}

/// `blobstore`'s root sits alongside the project working directories so a
/// `submit` can materialize an uploaded archive before a job ever touches
/// the filesystem. Not wired into [`AppContext`] since the consumer loop
/// only ever reads from `working_directory_root`.
#[must_use]
pub fn blob_store(data_dir: &std::path::Path) -> Arc<FilesystemBlobStore> {
    Arc::new(FilesystemBlobStore::new(data_dir.join("blobs")))
}
