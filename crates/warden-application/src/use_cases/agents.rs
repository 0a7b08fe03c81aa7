//! Agent Orchestrator (§4.12): fans analysis agents out over a project,
//! applies per-agent guardrails and the evidence rule, then aggregates a
//! single [`Report`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use itertools::Itertools;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use warden_domain::entities::{Project, ProjectId, Report, ReviewFinding, Severity, MAX_RECOMMENDATIONS};
use warden_domain::error::{Error, Result};
use warden_domain::ports::{
    AnalysisAgent, CheckpointStore, FindingRepository, MemoryMonitor, ProgressChannel,
    ProgressEvent, ProgressUpdate, ReportRepository, SlotKind, ConcurrencyLimiter,
};

/// Outcome of running all registered agents over one project.
#[derive(Debug, Clone)]
pub struct AgentRunResult {
    /// The aggregated report.
    pub report: Report,
    /// Findings that passed guardrails and the evidence rule.
    pub findings: Vec<ReviewFinding>,
    /// Human-readable "skipped due to missing evidence" / "invalid
    /// schema" / "agent failure" notes, folded into the report summary.
    pub skipped_notes: Vec<String>,
}

/// Orchestrates a fixed roster of [`AnalysisAgent`]s.
pub struct AgentOrchestrator {
    agents: Vec<Arc<dyn AnalysisAgent>>,
    limiter: Arc<dyn ConcurrencyLimiter>,
    memory: Arc<dyn MemoryMonitor>,
    checkpoint_store: Arc<dyn CheckpointStore>,
    finding_repo: Arc<dyn FindingRepository>,
    report_repo: Arc<dyn ReportRepository>,
    progress: Arc<dyn ProgressChannel>,
}

impl AgentOrchestrator {
    /// Builds an orchestrator with a fixed agent roster.
    #[must_use]
    pub fn new(
        agents: Vec<Arc<dyn AnalysisAgent>>,
        limiter: Arc<dyn ConcurrencyLimiter>,
        memory: Arc<dyn MemoryMonitor>,
        checkpoint_store: Arc<dyn CheckpointStore>,
        finding_repo: Arc<dyn FindingRepository>,
        report_repo: Arc<dyn ReportRepository>,
        progress: Arc<dyn ProgressChannel>,
    ) -> Self {
        Self {
            agents,
            limiter,
            memory,
            checkpoint_store,
            finding_repo,
            report_repo,
            progress,
        }
    }

    /// Runs every registered agent over `project`, sequentially, each
    /// under the Reasoning slot, applying guardrails and the evidence
    /// rule, then aggregates into a [`Report`].
    ///
    /// # Errors
    /// Returns [`warden_domain::Error::MemoryPause`] if the memory
    /// monitor's pause threshold is reached before an agent runs,
    /// [`warden_domain::Error::Cancelled`] if `cancellation` fires while
    /// waiting for a reasoning slot, or propagates a storage failure from
    /// persisting findings/report.
    pub async fn run(
        &self,
        project: &Project,
        working_directory: &Path,
        cancellation: &CancellationToken,
    ) -> Result<AgentRunResult> {
        let mut all_findings: Vec<ReviewFinding> = Vec::new();
        let mut skipped_notes: Vec<String> = Vec::new();
        let total_agents = self.agents.len().max(1);

        for (index, agent) in self.agents.iter().enumerate() {
            if self.memory.should_pause_processing() {
                if let Some(mut checkpoint) = self.checkpoint_store.get(project.id).await? {
                    self.checkpoint_store.update(&checkpoint).await.ok();
                    checkpoint.error_message = Some("paused before agent run: memory pressure".into());
                }
                return Err(warden_domain::Error::MemoryPause {
                    reason: "memory monitor pause threshold reached before agent run".into(),
                });
            }

            if cancellation.is_cancelled() {
                return Err(Error::Cancelled {
                    reason: "job cancellation requested before agent run".into(),
                });
            }
            let guard = tokio::select! {
                guard = self.limiter.acquire(SlotKind::Reasoning) => guard?,
                () = cancellation.cancelled() => {
                    return Err(Error::Cancelled {
                        reason: "job cancellation requested while waiting for a reasoning slot".into(),
                    });
                }
            };
            let raw = match agent.analyze(project.id, working_directory).await {
                Ok(findings) => findings,
                Err(e) => {
                    skipped_notes.push(format!("{}: agent failed ({e}); skipped", agent.agent_type()));
                    drop(guard);
                    self.emit_progress(project.id, index, total_agents);
                    continue;
                }
            };
            drop(guard);

            let guardrails = agent.guardrails();
            let mut filtered: Vec<ReviewFinding> = raw
                .into_iter()
                .filter(|f| f.confidence >= guardrails.min_confidence)
                .filter(|f| {
                    guardrails
                        .allowed_categories
                        .as_ref()
                        .is_none_or(|cats| cats.iter().any(|c| c == &f.category))
                })
                .collect();

            // dedupe by (FilePath, Symbol, Description), keeping the
            // highest-confidence copy
            let mut best: HashMap<(Option<String>, Option<String>, String), ReviewFinding> = HashMap::new();
            for f in filtered.drain(..) {
                let key = (f.file_path.clone(), f.symbol.clone(), f.description.clone());
                match best.get(&key) {
                    Some(existing) if existing.confidence >= f.confidence => {}
                    _ => {
                        best.insert(key, f);
                    }
                }
            }
            let mut deduped: Vec<ReviewFinding> = best.into_values().collect();
            deduped.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));
            deduped.truncate(guardrails.max_findings);

            for mut f in deduped {
                if f.has_evidence() {
                    f.report_id = None;
                    all_findings.push(f);
                } else {
                    skipped_notes.push(format!(
                        "{}: finding \"{}\" skipped due to missing evidence",
                        agent.agent_type(),
                        f.description
                    ));
                }
            }

            self.emit_progress(project.id, index, total_agents);
        }

        let report_id = Uuid::new_v4();
        for f in &mut all_findings {
            f.report_id = Some(report_id);
        }

        let critical_count = all_findings.iter().filter(|f| f.severity == Severity::Critical).count() as u32;
        let high_count = all_findings.iter().filter(|f| f.severity == Severity::High).count() as u32;
        let medium_count = all_findings.iter().filter(|f| f.severity == Severity::Medium).count() as u32;
        let low_count = all_findings.iter().filter(|f| f.severity == Severity::Low).count() as u32;
        let info_count = all_findings.iter().filter(|f| f.severity == Severity::Info).count() as u32;

        // Critical findings weigh at least as heavily as High in the
        // health-score formula; fold them into the High bucket for scoring.
        let health_score = Report::compute_health_score(high_count + critical_count, medium_count, low_count);

        let per_agent_lines: Vec<String> = self
            .agents
            .iter()
            .map(|a| {
                let count = all_findings.iter().filter(|f| f.agent_type == a.agent_type()).count();
                format!("{}: {count} finding(s)", a.agent_type())
            })
            .collect();

        let mut summary = format!(
            "critical={critical_count} high={high_count} medium={medium_count} low={low_count} info={info_count}\n{}",
            per_agent_lines.join("\n")
        );
        if !skipped_notes.is_empty() {
            let capped: Vec<&String> = skipped_notes.iter().take(10).collect();
            summary.push_str("\nskipped: ");
            summary.push_str(&capped.iter().map(|s| s.as_str()).join("; "));
            if skipped_notes.len() > capped.len() {
                summary.push_str(" ...");
            }
        }

        let recommendations: Vec<String> = all_findings
            .iter()
            .filter_map(|f| f.suggested_fix.clone())
            .unique()
            .take(MAX_RECOMMENDATIONS)
            .collect();

        let report = Report {
            id: report_id,
            project_id: project.id,
            health_score,
            summary,
            recommendations,
            critical_count,
            high_count,
            medium_count,
            low_count,
            info_count,
            duration_seconds: 0.0,
        };

        self.finding_repo.save_batch(&all_findings).await?;
        self.report_repo.save(&report).await?;

        Ok(AgentRunResult {
            report,
            findings: all_findings,
            skipped_notes,
        })
    }

    fn emit_progress(&self, project_id: ProjectId, agent_index: usize, total_agents: usize) {
        let percent = ((agent_index + 1) as f32 / total_agents as f32) * 100.0;
        self.progress.publish(ProgressEvent::Progress(ProgressUpdate {
            project_id,
            phase: "Analyzing".to_string(),
            progress_percent: percent,
            current_file: None,
            files_processed: (agent_index + 1) as u64,
            total_files: total_agents as u64,
        }));
    }
}
