//! LLM-backed [`AnalysisAgent`]: turns a project's working directory into
//! a bounded prompt, asks the model for findings as JSON, and validates
//! the response shape before handing anything back to the orchestrator.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;
use warden_domain::entities::{ProjectId, ReviewFinding, Severity};
use warden_domain::error::{Error, Result};
use warden_domain::ports::{AgentGuardrails, AnalysisAgent, CompletionRequest, LlmProvider};
use warden_infrastructure::resilience::{AdaptiveTimeout, NamedPipeline};

/// Bytes of source content included in one agent prompt, bounding both
/// prompt-token cost and memory.
const MAX_PROMPT_BYTES: usize = 60_000;

#[derive(Debug, Deserialize)]
struct RawFinding {
    category: String,
    severity: String,
    description: String,
    explanation: String,
    #[serde(default)]
    file_path: Option<String>,
    #[serde(default)]
    line_start: Option<u32>,
    #[serde(default)]
    line_end: Option<u32>,
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    suggested_fix: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawFindingsResponse {
    findings: Vec<RawFinding>,
}

fn parse_severity(s: &str) -> Severity {
    match s.to_ascii_lowercase().as_str() {
        "critical" => Severity::Critical,
        "high" => Severity::High,
        "medium" => Severity::Medium,
        "low" => Severity::Low,
        _ => Severity::Info,
    }
}

fn collect_prompt_content(working_directory: &Path) -> String {
    let mut content = String::new();
    if !working_directory.exists() {
        return content;
    }
    for entry in walkdir::WalkDir::new(working_directory).into_iter().filter_map(std::result::Result::ok) {
        if content.len() >= MAX_PROMPT_BYTES {
            break;
        }
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(text) = std::fs::read_to_string(entry.path()) else {
            continue;
        };
        let relative = entry.path().strip_prefix(working_directory).unwrap_or(entry.path()).to_string_lossy();
        content.push_str(&format!("\n--- {relative} ---\n"));
        let remaining = MAX_PROMPT_BYTES.saturating_sub(content.len());
        let truncated: String = text.chars().take(remaining).collect();
        content.push_str(&truncated);
    }
    content
}

/// Wraps an [`LlmProvider`] behind the `AnalysisAgent` port: one fixed
/// system prompt per agent instance, findings requested as JSON and
/// validated before being returned to the orchestrator.
pub struct LlmAnalysisAgent {
    agent_type: String,
    system_prompt: String,
    llm: Arc<dyn LlmProvider>,
    pipeline: NamedPipeline,
    adaptive_timeout: AdaptiveTimeout,
    max_tokens: u32,
    guardrails: AgentGuardrails,
}

impl LlmAnalysisAgent {
    /// Builds an agent identified by `agent_type`, prompting with
    /// `system_prompt`, calling through `pipeline`/`adaptive_timeout` for
    /// resilience.
    #[must_use]
    pub fn new(
        agent_type: impl Into<String>,
        system_prompt: impl Into<String>,
        llm: Arc<dyn LlmProvider>,
        pipeline: NamedPipeline,
        adaptive_timeout: AdaptiveTimeout,
        max_tokens: u32,
        guardrails: AgentGuardrails,
    ) -> Self {
        Self {
            agent_type: agent_type.into(),
            system_prompt: system_prompt.into(),
            llm,
            pipeline,
            adaptive_timeout,
            max_tokens,
            guardrails,
        }
    }

    fn parse_response(&self, project_id: ProjectId, content: &str) -> Result<Vec<ReviewFinding>> {
        let parsed: RawFindingsResponse = serde_json::from_str(content)
            .map_err(|e| Error::schema_invalid(format!("{} returned invalid findings JSON: {e}", self.agent_type)))?;

        Ok(parsed
            .findings
            .into_iter()
            .map(|raw| ReviewFinding {
                id: Uuid::new_v4(),
                project_id,
                report_id: None,
                category: raw.category,
                severity: parse_severity(&raw.severity),
                agent_type: self.agent_type.clone(),
                description: raw.description,
                explanation: raw.explanation,
                file_path: raw.file_path,
                line_range: raw.line_start.zip(raw.line_end),
                symbol: raw.symbol,
                suggested_fix: raw.suggested_fix,
                original_snippet: None,
                fixed_snippet: None,
                confidence: raw.confidence.unwrap_or(0.5).clamp(0.0, 1.0),
            })
            .collect())
    }
}

#[async_trait]
impl AnalysisAgent for LlmAnalysisAgent {
    fn agent_type(&self) -> &str {
        &self.agent_type
    }

    fn guardrails(&self) -> AgentGuardrails {
        self.guardrails.clone()
    }

    async fn analyze(&self, project_id: ProjectId, working_directory: &Path) -> Result<Vec<ReviewFinding>> {
        let source = collect_prompt_content(working_directory);
        let user_prompt = format!(
            "Review the following source files and report findings as JSON: \
            {{\"findings\": [{{\"category\": str, \"severity\": \"critical\"|\"high\"|\"medium\"|\"low\"|\"info\", \
            \"description\": str, \"explanation\": str, \"file_path\": str, \"line_start\": int, \"line_end\": int, \
            \"symbol\": str, \"suggested_fix\": str, \"confidence\": float}}]}}\n\n{source}"
        );

        let mut request = CompletionRequest::new(self.system_prompt.clone(), user_prompt);
        request.max_tokens = self.max_tokens;

        let llm = Arc::clone(&self.llm);
        let content = self
            .pipeline
            .run(self.adaptive_timeout.base_for(self.max_tokens), || {
                let llm = Arc::clone(&llm);
                let request = request.clone();
                let timeout = self.adaptive_timeout.base_for(self.max_tokens);
                async move { llm.analyze(&request, timeout).await.map(|r| r.content) }
            })
            .await?;

        self.parse_response(project_id, &content)
    }
}
