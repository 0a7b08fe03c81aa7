use async_trait::async_trait;
use std::path::Path;

use crate::entities::{ProjectId, ReviewFinding};
use crate::error::Result;

/// Per-agent guardrail configuration, applied by the Agent Orchestrator
/// after `AnalysisAgent::analyze` returns (§4.12).
#[derive(Debug, Clone)]
pub struct AgentGuardrails {
    /// Findings below this confidence are dropped.
    pub min_confidence: f64,
    /// When present, findings outside these categories are dropped.
    pub allowed_categories: Option<Vec<String>>,
    /// Cap on findings retained per agent, taken by descending confidence.
    pub max_findings: usize,
}

impl Default for AgentGuardrails {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            allowed_categories: None,
            max_findings: 25,
        }
    }
}

/// An abstract capability provider that inspects a project and proposes
/// findings (§4.12). Agent prompt content is out of scope; this trait
/// models only the provider contract.
#[async_trait]
pub trait AnalysisAgent: Send + Sync {
    /// Stable identifier used as `ReviewFinding::agent_type` and in
    /// progress/log output.
    fn agent_type(&self) -> &str;

    /// Guardrails the orchestrator should apply to this agent's output.
    fn guardrails(&self) -> AgentGuardrails {
        AgentGuardrails::default()
    }

    /// Runs the agent over `project_id`'s working directory, returning raw
    /// (unfiltered, unvalidated) findings. The orchestrator applies
    /// guardrails and the evidence rule afterward.
    ///
    /// # Errors
    /// Returns an error if the agent fails to run at all; the
    /// orchestrator records this as a synthetic Info-severity finding
    /// rather than aborting the whole run.
    async fn analyze(&self, project_id: ProjectId, working_directory: &Path) -> Result<Vec<ReviewFinding>>;
}
