//! Job Consumer: the top-level control flow described in §2 — pull one
//! message, acquire/create a checkpoint, index, analyze, aggregate.

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use warden_domain::entities::{CheckpointPhase, CheckpointStatus, JobCheckpoint, JobMessage, Project, ProjectStatus};
use warden_domain::error::{Error, Result};
use warden_domain::ports::{
    CheckpointStore, JobCompletion, JobQueue, ProgressChannel, ProgressEvent, ProjectRepository, Watchdog,
};

use super::agents::AgentOrchestrator;
use super::retrieval::RetrievalOrchestrator;

/// Maximum retry attempts before a checkpoint is dead-lettered
/// (`Worker.MaxRetryAttempts` default).
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Pulls one job at a time, drives it through Retrieval -> Agent
/// orchestration, and reconciles project/checkpoint state at the end.
pub struct JobConsumer {
    queue: Arc<dyn JobQueue>,
    project_repo: Arc<dyn ProjectRepository>,
    checkpoint_store: Arc<dyn CheckpointStore>,
    retrieval: Arc<RetrievalOrchestrator>,
    agents: Arc<AgentOrchestrator>,
    watchdog: Arc<dyn Watchdog>,
    progress: Arc<dyn ProgressChannel>,
    max_retries: u32,
}

impl JobConsumer {
    /// Builds a job consumer from its injected ports and orchestrators.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        queue: Arc<dyn JobQueue>,
        project_repo: Arc<dyn ProjectRepository>,
        checkpoint_store: Arc<dyn CheckpointStore>,
        retrieval: Arc<RetrievalOrchestrator>,
        agents: Arc<AgentOrchestrator>,
        watchdog: Arc<dyn Watchdog>,
        progress: Arc<dyn ProgressChannel>,
    ) -> Self {
        Self {
            queue,
            project_repo,
            checkpoint_store,
            retrieval,
            agents,
            watchdog,
            progress,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Dequeues and processes a single message, if one is ready.
    ///
    /// # Errors
    /// Returns an error only for queue transport failures; per-job
    /// failures are handled internally (checkpoint + `JobCompletion`) and
    /// do not propagate.
    pub async fn process_next(&self, working_directory_root: &Path, visibility_timeout_secs: u64) -> Result<bool> {
        let Some(message) = self.queue.dequeue(visibility_timeout_secs).await? else {
            return Ok(false);
        };

        let cancellation = CancellationToken::new();
        self.watchdog.register(message.project_id, cancellation.clone());

        let outcome = self.run_job(&message, working_directory_root, &cancellation).await;
        self.watchdog.complete(message.project_id);

        match outcome {
            Ok(()) => {
                self.queue.complete(message.job_id).await?;
            }
            Err(e) if e.kind().is_retriable() => {
                self.queue.abandon(message.job_id).await?;
            }
            Err(e) => {
                self.queue.dead_letter(message.job_id, &e.to_string()).await?;
            }
        }
        Ok(true)
    }

    async fn run_job(&self, message: &JobMessage, working_directory_root: &Path, cancellation: &CancellationToken) -> Result<()> {
        let project_id = message.project_id;
        info!(project_id = %project_id, job_id = %message.job_id, "starting analysis job");

        let mut project = self
            .project_repo
            .get(project_id)
            .await?
            .ok_or_else(|| Error::Fatal(format!("project {project_id} not found")))?;

        let mut checkpoint = match self.checkpoint_store.get(project_id).await? {
            Some(existing) if existing.status != CheckpointStatus::Completed => existing,
            _ => JobCheckpoint::new(project_id),
        };
        checkpoint.status = CheckpointStatus::InProgress;
        self.checkpoint_store.update(&checkpoint).await.or(self.checkpoint_store.add(&checkpoint).await)?;

        project.transition_to(ProjectStatus::Analyzing)?;
        self.project_repo.save(&project).await?;

        let working_directory = working_directory_root.join(project_id.to_string());

        let result = self.execute_pipeline(&project, &mut checkpoint, &working_directory, cancellation).await;

        match result {
            Ok(()) => {
                checkpoint.mark_completed();
                self.checkpoint_store.update(&checkpoint).await?;
                project.transition_to(ProjectStatus::Completed)?;
                self.project_repo.save(&project).await?;
                self.progress.publish(ProgressEvent::Completion(JobCompletion {
                    project_id,
                    is_success: true,
                    report_id: None,
                    error_kind: None,
                }));
                Ok(())
            }
            Err(e) => {
                error!(project_id = %project_id, error = %e, "analysis job failed");
                checkpoint.mark_failed(e.to_string(), self.max_retries);
                self.checkpoint_store.update(&checkpoint).await?;
                project.fail(e.to_string())?;
                self.project_repo.save(&project).await?;
                self.progress.publish(ProgressEvent::Completion(JobCompletion {
                    project_id,
                    is_success: false,
                    report_id: None,
                    error_kind: Some(e.kind()),
                }));
                Err(e)
            }
        }
    }

    async fn execute_pipeline(
        &self,
        project: &Project,
        checkpoint: &mut JobCheckpoint,
        working_directory: &Path,
        cancellation: &CancellationToken,
    ) -> Result<()> {
        checkpoint.advance_phase(CheckpointPhase::Extracting)?;
        self.checkpoint_store.update(checkpoint).await?;

        checkpoint.advance_phase(CheckpointPhase::Chunking)?;
        self.checkpoint_store.update(checkpoint).await?;

        let file_paths = list_project_files(working_directory)?;
        let total_files = file_paths.len() as u64;

        checkpoint.advance_phase(CheckpointPhase::Embedding)?;
        self.checkpoint_store.update(checkpoint).await?;
        let index_result = self
            .retrieval
            .index_project_streaming(project.id, working_directory, &file_paths, total_files, cancellation)
            .await?;
        checkpoint.files_processed = index_result.files_processed;
        checkpoint.chunks_indexed = index_result.chunks_created;
        checkpoint.embeddings_created = index_result.embeddings_generated;

        checkpoint.advance_phase(CheckpointPhase::Indexing)?;
        self.checkpoint_store.update(checkpoint).await?;

        checkpoint.advance_phase(CheckpointPhase::Analyzing)?;
        self.checkpoint_store.update(checkpoint).await?;
        self.agents.run(project, working_directory, cancellation).await?;

        checkpoint.advance_phase(CheckpointPhase::GeneratingReport)?;
        self.checkpoint_store.update(checkpoint).await?;

        Ok(())
    }
}

/// Enumerates a project's file paths (relative to `working_directory`)
/// without reading any content, so the retrieval pipeline can stream each
/// file-batch off disk lazily instead of materializing the whole tree.
fn list_project_files(working_directory: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    if !working_directory.exists() {
        return Ok(files);
    }
    for entry in walkdir::WalkDir::new(working_directory).into_iter().filter_map(std::result::Result::ok) {
        if entry.file_type().is_file() {
            let relative = entry
                .path()
                .strip_prefix(working_directory)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .to_string();
            files.push(relative);
        }
    }
    files.sort();
    Ok(files)
}
