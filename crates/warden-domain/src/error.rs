//! Domain-wide error and result types.
//!
//! Mirrors the error kinds described in the orchestrator's resilience
//! design: callers match on [`ErrorKind`] rather than downcasting, so
//! retry/circuit-breaker decisions and job outcomes stay provider-agnostic.

use thiserror::Error;

/// Coarse-grained error kind used for retry/circuit-breaker decisions and
/// for the `errorKind` surfaced on `JobCompletion` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transient failure from an external dependency (network blip, 5xx,
    /// rate limited). Retriable.
    ExternalUnavailable,
    /// A non-streaming call exceeded its adaptive timeout with no partial
    /// content to return.
    NonStreamingTimeout,
    /// A streaming call exceeded its adaptive timeout; partial content was
    /// returned with `FinishReason::Length`.
    StreamingTimeoutWithPartial,
    /// The breaker for this dependency is open; the call failed fast.
    CircuitOpen,
    /// An agent's structured output did not satisfy the finding schema.
    SchemaInvalid,
    /// A finding was discarded pre-persist for lacking file/line/symbol
    /// evidence.
    EvidenceMissing,
    /// The memory monitor's pause threshold was reached.
    MemoryPause,
    /// Cooperative cancellation was requested (client, watchdog, or pause).
    Cancelled,
    /// A non-retriable, non-recoverable failure (corrupt storage, invariant
    /// violation, invalid input schema).
    Fatal,
}

impl ErrorKind {
    /// Short machine-readable tag used on wire events and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExternalUnavailable => "external_unavailable",
            Self::NonStreamingTimeout => "non_streaming_timeout",
            Self::StreamingTimeoutWithPartial => "streaming_timeout_with_partial",
            Self::CircuitOpen => "circuit_open",
            Self::SchemaInvalid => "schema_invalid",
            Self::EvidenceMissing => "evidence_missing",
            Self::MemoryPause => "memory_pause",
            Self::Cancelled => "cancelled",
            Self::Fatal => "fatal",
        }
    }

    /// Whether the resilience layer should retry an operation that failed
    /// with this kind.
    #[must_use]
    pub const fn is_retriable(self) -> bool {
        matches!(
            self,
            Self::ExternalUnavailable | Self::NonStreamingTimeout
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain-wide error type.
///
/// Every variant carries an [`ErrorKind`] so orchestration code can make
/// retry/checkpoint/job-outcome decisions without string matching.
#[derive(Debug, Error)]
pub enum Error {
    /// A dependency call failed after exhausting retries, or failed fast
    /// because its breaker was open.
    #[error("{kind}: {message}")]
    External {
        /// Classification used for retry/breaker bookkeeping.
        kind: ErrorKind,
        /// Human-readable diagnostic (never shown to end users verbatim).
        message: String,
    },

    /// A timeout occurred; `partial` holds any content accumulated before
    /// the deadline when graceful degradation applies.
    #[error("timed out after {elapsed_ms}ms (requested {requested_timeout_ms}ms, {tokens_requested} tokens requested)")]
    Timeout {
        /// Whether this was a streaming call with recovered partial content.
        streaming: bool,
        /// Milliseconds actually elapsed before the timeout fired.
        elapsed_ms: u64,
        /// The timeout that was in effect.
        requested_timeout_ms: u64,
        /// `max_tokens` requested, for diagnostics.
        tokens_requested: u32,
        /// Partial content accumulated so far (streaming + graceful degradation only).
        partial: Option<String>,
    },

    /// The job's memory monitor reached `ShouldPauseProcessing`.
    #[error("processing paused on resource pressure: {reason}")]
    MemoryPause {
        /// Why the run was paused (RSS percentage, threshold, etc.).
        reason: String,
    },

    /// Cooperative cancellation fired (client abort, watchdog, or pause).
    #[error("operation cancelled: {reason}")]
    Cancelled {
        /// Source of the cancellation, for logs.
        reason: String,
    },

    /// Invariant violation, corrupt persisted state, or any other
    /// unrecoverable condition.
    #[error("fatal: {0}")]
    Fatal(String),

    /// Validation failure on an input value (not a dependency failure).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A required configuration value was missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Wraps an I/O failure encountered while reading/writing project files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Wraps a JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl Error {
    /// Classifies this error into the coarse [`ErrorKind`] used by the
    /// resilience layer and job-completion reporting.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::External { kind, .. } => *kind,
            Self::Timeout { streaming: true, .. } => ErrorKind::StreamingTimeoutWithPartial,
            Self::Timeout { streaming: false, .. } => ErrorKind::NonStreamingTimeout,
            Self::MemoryPause { .. } => ErrorKind::MemoryPause,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::Fatal(_) | Self::Io(_) | Self::Serde(_) => ErrorKind::Fatal,
            Self::InvalidInput(_) | Self::Config(_) => ErrorKind::Fatal,
        }
    }

    /// Builds an [`Error::External`] of kind [`ErrorKind::ExternalUnavailable`].
    #[must_use]
    pub fn external_unavailable(message: impl Into<String>) -> Self {
        Self::External {
            kind: ErrorKind::ExternalUnavailable,
            message: message.into(),
        }
    }

    /// Builds an [`Error::External`] of kind [`ErrorKind::CircuitOpen`].
    #[must_use]
    pub fn circuit_open(message: impl Into<String>) -> Self {
        Self::External {
            kind: ErrorKind::CircuitOpen,
            message: message.into(),
        }
    }

    /// Builds an [`Error::External`] of kind [`ErrorKind::SchemaInvalid`].
    #[must_use]
    pub fn schema_invalid(message: impl Into<String>) -> Self {
        Self::External {
            kind: ErrorKind::SchemaInvalid,
            message: message.into(),
        }
    }
}

/// Domain-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
