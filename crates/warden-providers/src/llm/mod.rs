//! LLM Client (§4.4): an OpenAI-compatible chat-completion adapter with
//! adaptive-timeout cooperation and graceful streaming degradation.
//! Composes with the resilience layer's `LLMPipeline`; this adapter never
//! retries or trips a breaker on its own.

use std::time::{Duration, Instant};

use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use futures::StreamExt;
use warden_domain::error::{Error, Result};
use warden_domain::ports::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider, StreamCallback};

mod agent;
pub use agent::LlmAnalysisAgent;

/// OpenAI-compatible chat-completion provider. Works against the OpenAI
/// API or any API-compatible endpoint (set via `OpenAIConfig::with_api_base`).
pub struct OpenAiLlmProvider {
    client: Client<OpenAIConfig>,
    model: String,
    name: String,
    enable_graceful_degradation: bool,
}

impl OpenAiLlmProvider {
    /// Builds a provider targeting `model`, using `config` for
    /// credentials/endpoint.
    #[must_use]
    pub fn new(config: OpenAIConfig, model: impl Into<String>, enable_graceful_degradation: bool) -> Self {
        let model = model.into();
        Self {
            name: format!("openai:{model}"),
            client: Client::with_config(config),
            model,
            enable_graceful_degradation,
        }
    }

    fn build_request(&self, req: &CompletionRequest) -> Result<async_openai::types::CreateChatCompletionRequest> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(req.system_prompt.clone())
            .build()
            .map_err(|e| Error::InvalidInput(format!("invalid system prompt: {e}")))?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(req.user_prompt.clone())
            .build()
            .map_err(|e| Error::InvalidInput(format!("invalid user prompt: {e}")))?;

        CreateChatCompletionRequestArgs::default()
            .model(self.model.clone())
            .temperature(req.temperature)
            .max_tokens(req.max_tokens)
            .messages(vec![system.into(), user.into()])
            .build()
            .map_err(|e| Error::InvalidInput(format!("invalid completion request: {e}")))
    }
}

#[async_trait]
impl LlmProvider for OpenAiLlmProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn analyze(&self, req: &CompletionRequest, timeout: Duration) -> Result<CompletionResponse> {
        let request = self.build_request(req)?;
        let start = Instant::now();

        match tokio::time::timeout(timeout, self.client.chat().create(request)).await {
            Ok(Ok(response)) => {
                let choice = response
                    .choices
                    .first()
                    .ok_or_else(|| Error::Fatal("openai response carried no choices".to_string()))?;
                let content = choice.message.content.clone().unwrap_or_default();
                let usage = response.usage.as_ref();
                Ok(CompletionResponse {
                    content,
                    prompt_tokens: usage.map_or(0, |u| u.prompt_tokens),
                    completion_tokens: usage.map_or(0, |u| u.completion_tokens),
                    duration: start.elapsed(),
                    finish_reason: FinishReason::Completed,
                })
            }
            Ok(Err(e)) => Err(Error::external_unavailable(format!("chat completion failed: {e}"))),
            Err(_) => Err(Error::Timeout {
                streaming: false,
                elapsed_ms: start.elapsed().as_millis() as u64,
                requested_timeout_ms: timeout.as_millis() as u64,
                tokens_requested: req.max_tokens,
                partial: None,
            }),
        }
    }

    async fn analyze_streaming(&self, req: &CompletionRequest, timeout: Duration, mut on_chunk: StreamCallback<'_>) -> Result<CompletionResponse> {
        let mut request = self.build_request(req)?;
        request.stream = Some(true);
        let start = Instant::now();

        // `content` lives outside the timed future so the partial text
        // survives if `tokio::time::timeout` cancels the stream mid-flight.
        let accumulated = std::sync::Arc::new(std::sync::Mutex::new(String::new()));
        let accumulated_for_stream = std::sync::Arc::clone(&accumulated);

        let stream_result = tokio::time::timeout(timeout, async {
            let mut stream = self
                .client
                .chat()
                .create_stream(request)
                .await
                .map_err(|e| Error::external_unavailable(format!("failed to open completion stream: {e}")))?;

            while let Some(next) = stream.next().await {
                let chunk = next.map_err(|e| Error::external_unavailable(format!("stream chunk failed: {e}")))?;
                if let Some(choice) = chunk.choices.first() {
                    if let Some(delta) = &choice.delta.content {
                        on_chunk(delta);
                        accumulated_for_stream.lock().expect("accumulator mutex poisoned").push_str(delta);
                    }
                }
            }
            Ok::<(), Error>(())
        })
        .await;

        match stream_result {
            Ok(Ok(())) => Ok(CompletionResponse {
                content: accumulated.lock().expect("accumulator mutex poisoned").clone(),
                prompt_tokens: 0,
                completion_tokens: 0,
                duration: start.elapsed(),
                finish_reason: FinishReason::Completed,
            }),
            Ok(Err(e)) => Err(e),
            Err(_) if self.enable_graceful_degradation => Ok(CompletionResponse {
                content: accumulated.lock().expect("accumulator mutex poisoned").clone(),
                prompt_tokens: 0,
                completion_tokens: 0,
                duration: start.elapsed(),
                finish_reason: FinishReason::Length,
            }),
            Err(_) => Err(Error::Timeout {
                streaming: true,
                elapsed_ms: start.elapsed().as_millis() as u64,
                requested_timeout_ms: timeout.as_millis() as u64,
                tokens_requested: req.max_tokens,
                partial: Some(accumulated.lock().expect("accumulator mutex poisoned").clone()),
            }),
        }
    }
}
