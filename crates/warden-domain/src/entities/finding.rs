use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::project::ProjectId;

/// Severity classification of a [`ReviewFinding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Informational; does not affect health score beyond the Low bucket.
    Info,
    /// Low severity.
    Low,
    /// Medium severity.
    Medium,
    /// High severity.
    High,
    /// Critical severity.
    Critical,
}

/// A single assertion produced by an analysis agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewFinding {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning project.
    pub project_id: ProjectId,
    /// Owning report, once aggregated.
    pub report_id: Option<Uuid>,
    /// Free-form category tag assigned by the producing agent.
    pub category: String,
    /// Severity classification.
    pub severity: Severity,
    /// Name/type of the agent that produced this finding.
    pub agent_type: String,
    /// Short one-line description.
    pub description: String,
    /// Longer explanation of the issue and its impact.
    pub explanation: String,
    /// Path of the affected file, if any.
    pub file_path: Option<String>,
    /// Affected line range, if any: `(start, end)`, 1-based inclusive.
    pub line_range: Option<(u32, u32)>,
    /// Named symbol (function, type, etc.) the finding refers to.
    pub symbol: Option<String>,
    /// Suggested remediation, in prose.
    pub suggested_fix: Option<String>,
    /// Original code snippet, for before/after display.
    pub original_snippet: Option<String>,
    /// Proposed replacement snippet.
    pub fixed_snippet: Option<String>,
    /// Agent-reported confidence in `[0, 1]`.
    pub confidence: f64,
}

impl ReviewFinding {
    /// Evidence-first rule from the data model: a finding must point to a
    /// file and either a non-trivial line range or a named symbol.
    #[must_use]
    pub fn has_evidence(&self) -> bool {
        let Some(path) = &self.file_path else {
            return false;
        };
        if path.is_empty() {
            return false;
        }
        let has_lines = self.line_range.is_some_and(|(start, _)| start > 0);
        let has_symbol = self.symbol.as_ref().is_some_and(|s| !s.is_empty());
        has_lines || has_symbol
    }

    /// Dedup key used by the Agent Orchestrator's guardrails:
    /// `(FilePath, Symbol, Description)`.
    #[must_use]
    pub fn dedup_key(&self) -> (Option<&str>, Option<&str>, &str) {
        (
            self.file_path.as_deref(),
            self.symbol.as_deref(),
            self.description.as_str(),
        )
    }
}
