use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::Stream;

use crate::error::Result;

/// Why a completion stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// The model completed its response normally.
    Completed,
    /// The response was truncated (token limit, or a streaming timeout
    /// under graceful degradation).
    Length,
    /// The provider reported an error mid-response.
    Error,
}

/// Request shape for both non-streaming and streaming completions.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System-level instructions.
    pub system_prompt: String,
    /// User-level content to analyze.
    pub user_prompt: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Builds a request with the spec's defaults: `temperature=0.3`,
    /// `max_tokens=4096`.
    #[must_use]
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            temperature: 0.3,
            max_tokens: 4096,
        }
    }
}

/// Response shape for a completed (or gracefully-degraded) call.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated content (partial, under graceful degradation).
    pub content: String,
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u32,
    /// Tokens generated.
    pub completion_tokens: u32,
    /// Wall-clock call duration.
    pub duration: Duration,
    /// How the call finished.
    pub finish_reason: FinishReason,
}

/// A chunk of streamed content, delivered to the caller-supplied callback.
pub type StreamCallback<'a> = Box<dyn FnMut(&str) + Send + 'a>;

/// Boxed stream of streamed text chunks, used by adapters that expose a
/// `Stream`-based API instead of a callback.
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Non-streaming and streaming LLM completions with adaptive timeouts
/// (§4.4). Implementations compose with the resilience layer's
/// `LLMPipeline`; they must not implement their own retry/breaker logic.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Identifying provider/model name, for diagnostics and logs.
    fn name(&self) -> &str;

    /// Whether the provider currently believes it can serve requests
    /// (e.g. has valid credentials / reachable endpoint configured).
    fn is_available(&self) -> bool;

    /// Issues a non-streaming completion.
    ///
    /// # Errors
    /// Returns [`crate::Error::Timeout`] (`streaming = false`) if the
    /// adaptive timeout elapses, or [`crate::Error::External`] for
    /// provider failures.
    async fn analyze(&self, req: &CompletionRequest, timeout: Duration) -> Result<CompletionResponse>;

    /// Issues a streaming completion, invoking `on_chunk` for every
    /// streamed fragment. On a streaming timeout with graceful
    /// degradation enabled, returns the partial content accumulated so
    /// far with `FinishReason::Length` instead of erroring.
    ///
    /// # Errors
    /// Returns [`crate::Error::Timeout`] (`streaming = true`) when
    /// graceful degradation is disabled, or [`crate::Error::External`]
    /// for provider failures.
    async fn analyze_streaming(
        &self,
        req: &CompletionRequest,
        timeout: Duration,
        on_chunk: StreamCallback<'_>,
    ) -> Result<CompletionResponse>;
}
