use serde::{Deserialize, Serialize};

/// Adaptive-timeout parameters (§4.4, §6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutStrategyConfig {
    /// Fixed baseline added to every timeout.
    pub base_timeout_seconds: f64,
    /// Additional timeout per requested token, in milliseconds.
    pub per_token_timeout_ms: f64,
    /// Lower clamp.
    pub min_timeout_seconds: f64,
    /// Upper clamp.
    pub max_timeout_seconds: f64,
    /// Multiplier applied for streaming requests.
    pub streaming_timeout_multiplier: f64,
    /// Multiplier applied per retry attempt.
    pub retry_timeout_multiplier: f64,
    /// Whether a streaming timeout returns partial content instead of
    /// failing outright.
    pub enable_graceful_degradation: bool,
    /// Whether the HTTP client pools/reuses connections.
    pub enable_connection_pooling: bool,
    /// Keep-alive timeout for pooled connections.
    pub keep_alive_timeout_seconds: u64,
    /// Explicit static timeout used when `UseAdaptiveTimeout=false`; falls
    /// back to `max_timeout_seconds` when absent (§9, Open Question 1).
    pub static_timeout_seconds: Option<f64>,
}

impl Default for TimeoutStrategyConfig {
    fn default() -> Self {
        Self {
            base_timeout_seconds: 60.0,
            per_token_timeout_ms: 10.0,
            min_timeout_seconds: 30.0,
            max_timeout_seconds: 600.0,
            streaming_timeout_multiplier: 1.5,
            retry_timeout_multiplier: 1.2,
            enable_graceful_degradation: true,
            enable_connection_pooling: true,
            keep_alive_timeout_seconds: 300,
            static_timeout_seconds: None,
        }
    }
}

/// Named-semaphore sizes (§4.8, §6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// Embedding slot count.
    pub embedding: usize,
    /// Reasoning slot count.
    pub reasoning: usize,
    /// File-read slot count.
    pub file_read: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            embedding: 4,
            reasoning: 2,
            file_read: 8,
        }
    }
}

/// RSS sampling thresholds (§4.9, §6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryManagementConfig {
    /// Budget against which usage percent is computed.
    pub max_worker_memory_mb: u64,
    /// Warning threshold percent.
    pub warning_threshold_percent: f64,
    /// Pause threshold percent.
    pub pause_threshold_percent: f64,
    /// Sampling interval.
    pub check_interval_seconds: u64,
}

impl Default for MemoryManagementConfig {
    fn default() -> Self {
        Self {
            max_worker_memory_mb: 4096,
            warning_threshold_percent: 80.0,
            pause_threshold_percent: 90.0,
            check_interval_seconds: 1,
        }
    }
}

/// Chunking/routing/retrieval parameters (§4.2, §4.6, §6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Files under this size route `DirectSend`.
    pub direct_send_threshold_bytes: u64,
    /// Files up to this size route `RagChunks`.
    pub rag_chunk_threshold_bytes: u64,
    /// Overrides the large-file skip cliff.
    pub allow_large_files: bool,
    /// Candidate count for the risk scorer's top-K similarity search.
    pub risk_top_k: usize,
    /// Score threshold marking a file high-risk.
    pub risk_threshold: f64,
    /// Max tokens per chunk.
    pub chunk_size_tokens: u32,
    /// Sliding-window overlap, in tokens.
    pub overlap_tokens: u32,
    /// Chunks below this are dropped.
    pub min_chunk_tokens: u32,
    /// Vector query result count.
    pub top_k: usize,
    /// Minimum similarity score surfaced to callers.
    pub min_similarity_score: f64,
    /// Maximum tokens assembled into one analysis context.
    pub max_context_tokens: u32,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            direct_send_threshold_bytes: 10_240,
            rag_chunk_threshold_bytes: 204_800,
            allow_large_files: false,
            risk_top_k: 20,
            risk_threshold: 0.7,
            chunk_size_tokens: 1_600,
            overlap_tokens: 200,
            min_chunk_tokens: 100,
            top_k: 10,
            min_similarity_score: 0.7,
            max_context_tokens: 8_000,
        }
    }
}

/// Watchdog thresholds (§4.11, §6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Whether the watchdog runs at all.
    pub enabled: bool,
    /// Scan cadence.
    pub check_interval_seconds: u64,
    /// Maximum total job duration before a job is stuck.
    pub max_project_duration_seconds: u64,
    /// Maximum gap between heartbeats before a job is stuck.
    pub max_heartbeat_interval_seconds: u64,
    /// Whether stuck jobs are automatically cancelled.
    pub auto_cancel_stuck: bool,
    /// Consecutive stuck observations required before cancelling.
    pub stuck_detection_threshold: u32,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval_seconds: 30,
            max_project_duration_seconds: 600,
            max_heartbeat_interval_seconds: 120,
            auto_cancel_stuck: true,
            stuck_detection_threshold: 2,
        }
    }
}

/// Worker-level job scheduling parameters (§5, §6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Max jobs running concurrently per worker process.
    pub max_concurrent_jobs: usize,
    /// Checkpoint cadence, in files processed.
    pub checkpoint_interval_files: u64,
    /// Max retry attempts before dead-lettering.
    pub max_retry_attempts: u32,
    /// Delay before a `PendingRetry` checkpoint is retried.
    pub retry_delay_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 3,
            checkpoint_interval_files: 100,
            max_retry_attempts: 3,
            retry_delay_seconds: 30,
        }
    }
}

/// Structured-logging configuration (`SPEC_FULL.md` §2.1/§2.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` env-filter directive (e.g. `"info"`, `"warden=debug"`).
    pub level: String,
    /// `"json"` for production, `"pretty"` for local development.
    pub format: String,
    /// Optional rolling-file directory; stdout-only when absent.
    pub rolling_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
            rolling_file: None,
        }
    }
}

/// Persistence configuration (`SPEC_FULL.md` §2.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// SQLx connection URL for the checkpoint/chunk/report metadata store.
    pub database_url: String,
    /// Connection pool size.
    pub max_connections: u32,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://warden.db".to_string(),
            max_connections: 10,
        }
    }
}
