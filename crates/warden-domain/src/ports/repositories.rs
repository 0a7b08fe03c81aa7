use async_trait::async_trait;

use crate::entities::{Chunk, ChunkHash, Project, ProjectId, Report, ReviewFinding};
use crate::error::Result;

/// Persistence for [`Project`] rows. Out of scope per §1 beyond the
/// subset the pipeline itself reads/writes (status, counters, timestamps).
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Fetches a project by id.
    ///
    /// # Errors
    /// Returns an error for storage failures.
    async fn get(&self, id: ProjectId) -> Result<Option<Project>>;

    /// Persists a project (insert or full update).
    ///
    /// # Errors
    /// Returns an error for storage failures.
    async fn save(&self, project: &Project) -> Result<()>;
}

/// Persistence for [`Chunk`] rows, with dedup support for the Retrieval
/// Orchestrator's per-batch seen-set (§4.10).
#[async_trait]
pub trait ChunkRepository: Send + Sync {
    /// Checks which of `hashes` already exist for `project_id`.
    ///
    /// # Errors
    /// Returns an error for storage failures.
    async fn existing_hashes(&self, project_id: ProjectId, hashes: &[ChunkHash]) -> Result<Vec<ChunkHash>>;

    /// Persists a batch of chunks (upsert by `(project_id, chunk_hash)`).
    ///
    /// # Errors
    /// Returns an error for storage failures.
    async fn save_batch(&self, chunks: &[Chunk]) -> Result<()>;

    /// Removes a single chunk row by `(project_id, chunk_hash)`. Used to
    /// compensate a chunk whose vector-store upsert failed after the row
    /// was already saved, so it is not permanently excluded by the
    /// `existing_hashes` dedup check on a later retry.
    ///
    /// # Errors
    /// Returns an error for storage failures.
    async fn delete_chunk(&self, project_id: ProjectId, hash: ChunkHash) -> Result<()>;

    /// Counts chunks stored for a project.
    ///
    /// # Errors
    /// Returns an error for storage failures.
    async fn count(&self, project_id: ProjectId) -> Result<u64>;
}

/// Persistence for [`ReviewFinding`] rows, written only after the
/// evidence rule and guardrails have been applied.
#[async_trait]
pub trait FindingRepository: Send + Sync {
    /// Persists a batch of findings.
    ///
    /// # Errors
    /// Returns an error for storage failures.
    async fn save_batch(&self, findings: &[ReviewFinding]) -> Result<()>;

    /// Fetches every finding for a project.
    ///
    /// # Errors
    /// Returns an error for storage failures.
    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<ReviewFinding>>;
}

/// Persistence for [`Report`] rows. At most one per project.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Persists a report (insert or replace the project's single report).
    ///
    /// # Errors
    /// Returns an error for storage failures.
    async fn save(&self, report: &Report) -> Result<()>;

    /// Fetches the report for a project, if one exists.
    ///
    /// # Errors
    /// Returns an error for storage failures.
    async fn get_for_project(&self, project_id: ProjectId) -> Result<Option<Report>>;
}
