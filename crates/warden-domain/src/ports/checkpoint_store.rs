use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{CheckpointStatus, JobCheckpoint, ProjectId};
use crate::error::Result;

/// Durable checkpoint persistence (§4.14).
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Fetches the active checkpoint for a project, if any.
    ///
    /// # Errors
    /// Returns an error for storage failures.
    async fn get(&self, project_id: ProjectId) -> Result<Option<JobCheckpoint>>;

    /// Fetches every checkpoint currently in `status`.
    ///
    /// # Errors
    /// Returns an error for storage failures.
    async fn get_by_status(&self, status: CheckpointStatus) -> Result<Vec<JobCheckpoint>>;

    /// Fetches checkpoints in `PendingRetry` with `retry_count < max_retries`.
    ///
    /// # Errors
    /// Returns an error for storage failures.
    async fn get_pending_retry(&self, max_retries: u32) -> Result<Vec<JobCheckpoint>>;

    /// Persists a brand-new checkpoint.
    ///
    /// # Errors
    /// Returns an error for storage failures.
    async fn add(&self, checkpoint: &JobCheckpoint) -> Result<()>;

    /// Persists an update to an existing checkpoint. Updates for one
    /// `project_id` are serialized by the store.
    ///
    /// # Errors
    /// Returns an error for storage failures.
    async fn update(&self, checkpoint: &JobCheckpoint) -> Result<()>;

    /// Deletes the checkpoint for a project.
    ///
    /// # Errors
    /// Returns an error for storage failures.
    async fn delete_by_project(&self, project_id: ProjectId) -> Result<()>;

    /// Deletes every checkpoint last updated before `cutoff`.
    ///
    /// # Errors
    /// Returns an error for storage failures.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}
