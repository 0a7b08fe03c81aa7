use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::project::ProjectId;

/// Coarse processing phase of a job, monotonic non-decreasing within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CheckpointPhase {
    /// No work has started.
    NotStarted,
    /// Extracting the uploaded/cloned source.
    Extracting,
    /// Splitting routed files into chunks.
    Chunking,
    /// Embedding chunks.
    Embedding,
    /// Upserting embeddings and chunk rows.
    Indexing,
    /// Running analysis agents.
    Analyzing,
    /// Aggregating findings into a report.
    GeneratingReport,
    /// Run finished.
    Completed,
}

/// Checkpoint-level job status, distinct from [`crate::entities::ProjectStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckpointStatus {
    /// Created, not yet picked up by a worker.
    Pending,
    /// A worker is actively processing this checkpoint.
    InProgress,
    /// Run completed successfully.
    Completed,
    /// Run failed and will not be retried (either non-retriable or
    /// retries exhausted, see `DeadLettered`).
    Failed,
    /// Run failed but is eligible for another attempt after a delay.
    PendingRetry,
    /// Retries exhausted; requires manual/supervisor intervention.
    DeadLettered,
}

/// Durable resume state for one project's analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCheckpoint {
    /// Owning project. At most one *active* checkpoint per project.
    pub project_id: ProjectId,
    /// Current processing phase.
    pub phase: CheckpointPhase,
    /// Index (into the routed file list) of the last file fully processed.
    pub last_processed_file_index: u64,
    /// Count of files processed so far.
    pub files_processed: u64,
    /// Count of chunks upserted so far.
    pub chunks_indexed: u64,
    /// Count of embedding vectors created so far.
    pub embeddings_created: u64,
    /// Count of chunks dropped (below `MinChunkTokens`, dedup hits, etc.).
    pub chunks_skipped: u64,
    /// Running total of tokens processed across all chunks/files.
    pub total_tokens_processed: u64,
    /// Checkpoint-level status.
    pub status: CheckpointStatus,
    /// Number of attempts made so far.
    pub retry_count: u32,
    /// Timestamp of the last persisted update.
    pub last_checkpoint_at: DateTime<Utc>,
    /// Opaque serialized `AnalysisPlan`, so resumers skip re-planning.
    pub serialized_state: Option<Vec<u8>>,
    /// Error message, set when `status` is `Failed`/`PendingRetry`/`DeadLettered`.
    pub error_message: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl JobCheckpoint {
    /// Creates a fresh checkpoint for `project_id` in the `NotStarted`
    /// phase and `Pending` status.
    #[must_use]
    pub fn new(project_id: ProjectId) -> Self {
        let now = Utc::now();
        Self {
            project_id,
            phase: CheckpointPhase::NotStarted,
            last_processed_file_index: 0,
            files_processed: 0,
            chunks_indexed: 0,
            embeddings_created: 0,
            chunks_skipped: 0,
            total_tokens_processed: 0,
            status: CheckpointStatus::Pending,
            retry_count: 0,
            last_checkpoint_at: now,
            serialized_state: None,
            error_message: None,
            created_at: now,
        }
    }

    /// Advances to `next`, enforcing the monotonic-phase invariant.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] if `next` is not `>= self.phase`.
    pub fn advance_phase(&mut self, next: CheckpointPhase) -> Result<()> {
        if next < self.phase {
            return Err(Error::InvalidInput(format!(
                "checkpoint phase must be monotonic non-decreasing: {:?} -> {:?}",
                self.phase, next
            )));
        }
        self.phase = next;
        self.last_checkpoint_at = Utc::now();
        Ok(())
    }

    /// Marks the checkpoint `Completed`.
    pub fn mark_completed(&mut self) {
        self.phase = CheckpointPhase::Completed;
        self.status = CheckpointStatus::Completed;
        self.last_checkpoint_at = Utc::now();
    }

    /// Marks the checkpoint failed with `message`, flipping to
    /// `PendingRetry` if `retry_count < max_retries`, else `DeadLettered`.
    pub fn mark_failed(&mut self, message: impl Into<String>, max_retries: u32) {
        self.error_message = Some(message.into());
        self.last_checkpoint_at = Utc::now();
        if self.retry_count < max_retries {
            self.retry_count += 1;
            self.status = CheckpointStatus::PendingRetry;
        } else {
            self.status = CheckpointStatus::DeadLettered;
        }
    }

    /// Whether another retry attempt is permitted.
    #[must_use]
    pub fn can_retry(&self, max_retries: u32) -> bool {
        self.retry_count < max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_must_not_regress() {
        let mut cp = JobCheckpoint::new(ProjectId::new());
        cp.advance_phase(CheckpointPhase::Chunking).unwrap();
        assert!(cp.advance_phase(CheckpointPhase::Extracting).is_err());
    }

    #[test]
    fn failure_dead_letters_after_max_retries() {
        let mut cp = JobCheckpoint::new(ProjectId::new());
        for _ in 0..3 {
            cp.mark_failed("boom", 3);
        }
        assert_eq!(cp.status, CheckpointStatus::DeadLettered);
    }

    #[test]
    fn failure_retries_before_max() {
        let mut cp = JobCheckpoint::new(ProjectId::new());
        cp.mark_failed("boom", 3);
        assert_eq!(cp.status, CheckpointStatus::PendingRetry);
        assert_eq!(cp.retry_count, 1);
    }
}
