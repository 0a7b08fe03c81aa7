//! Checkpoint Store (§4.14): SQLite-backed durable resume state, grounded
//! on the teacher's checkpoint schema and persisted through the
//! schema-as-code DDL in `warden_domain::schema`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use warden_domain::entities::{CheckpointPhase, CheckpointStatus, JobCheckpoint, ProjectId};
use warden_domain::error::{Error, Result};
use warden_domain::ports::CheckpointStore;
use warden_domain::schema::job_checkpoints_table;

fn phase_to_str(phase: CheckpointPhase) -> &'static str {
    match phase {
        CheckpointPhase::NotStarted => "NotStarted",
        CheckpointPhase::Extracting => "Extracting",
        CheckpointPhase::Chunking => "Chunking",
        CheckpointPhase::Embedding => "Embedding",
        CheckpointPhase::Indexing => "Indexing",
        CheckpointPhase::Analyzing => "Analyzing",
        CheckpointPhase::GeneratingReport => "GeneratingReport",
        CheckpointPhase::Completed => "Completed",
    }
}

fn phase_from_str(s: &str) -> Result<CheckpointPhase> {
    match s {
        "NotStarted" => Ok(CheckpointPhase::NotStarted),
        "Extracting" => Ok(CheckpointPhase::Extracting),
        "Chunking" => Ok(CheckpointPhase::Chunking),
        "Embedding" => Ok(CheckpointPhase::Embedding),
        "Indexing" => Ok(CheckpointPhase::Indexing),
        "Analyzing" => Ok(CheckpointPhase::Analyzing),
        "GeneratingReport" => Ok(CheckpointPhase::GeneratingReport),
        "Completed" => Ok(CheckpointPhase::Completed),
        other => Err(Error::Fatal(format!("unknown checkpoint phase {other:?} in storage"))),
    }
}

fn status_to_str(status: CheckpointStatus) -> &'static str {
    match status {
        CheckpointStatus::Pending => "Pending",
        CheckpointStatus::InProgress => "InProgress",
        CheckpointStatus::Completed => "Completed",
        CheckpointStatus::Failed => "Failed",
        CheckpointStatus::PendingRetry => "PendingRetry",
        CheckpointStatus::DeadLettered => "DeadLettered",
    }
}

fn status_from_str(s: &str) -> Result<CheckpointStatus> {
    match s {
        "Pending" => Ok(CheckpointStatus::Pending),
        "InProgress" => Ok(CheckpointStatus::InProgress),
        "Completed" => Ok(CheckpointStatus::Completed),
        "Failed" => Ok(CheckpointStatus::Failed),
        "PendingRetry" => Ok(CheckpointStatus::PendingRetry),
        "DeadLettered" => Ok(CheckpointStatus::DeadLettered),
        other => Err(Error::Fatal(format!("unknown checkpoint status {other:?} in storage"))),
    }
}

/// SQLite-backed [`CheckpointStore`].
pub struct SqliteCheckpointStore {
    pool: SqlitePool,
}

impl SqliteCheckpointStore {
    /// Connects to `database_url` and ensures the `job_checkpoints` table
    /// (and its indexes) exist.
    ///
    /// # Errors
    /// Returns an error if the connection or schema migration fails.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| Error::Config(format!("failed to connect to checkpoint store: {e}")))?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        let table = job_checkpoints_table();
        sqlx::query(&table.create_table_ddl())
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Fatal(format!("failed to create job_checkpoints table: {e}")))?;
        for ddl in table.create_index_ddl() {
            sqlx::query(&ddl)
                .execute(&self.pool)
                .await
                .map_err(|e| Error::Fatal(format!("failed to create job_checkpoints index: {e}")))?;
        }
        Ok(())
    }

    fn row_to_checkpoint(row: &sqlx::sqlite::SqliteRow) -> Result<JobCheckpoint> {
        let project_id: uuid::Uuid = row.try_get("project_id").map_err(|e| Error::Fatal(e.to_string()))?;
        let phase: String = row.try_get("phase").map_err(|e| Error::Fatal(e.to_string()))?;
        let status: String = row.try_get("status").map_err(|e| Error::Fatal(e.to_string()))?;

        Ok(JobCheckpoint {
            project_id: ProjectId(project_id),
            phase: phase_from_str(&phase)?,
            last_processed_file_index: row.try_get::<i64, _>("last_processed_file_index").map_err(|e| Error::Fatal(e.to_string()))? as u64,
            files_processed: row.try_get::<i64, _>("files_processed").map_err(|e| Error::Fatal(e.to_string()))? as u64,
            chunks_indexed: row.try_get::<i64, _>("chunks_indexed").map_err(|e| Error::Fatal(e.to_string()))? as u64,
            embeddings_created: row.try_get::<i64, _>("embeddings_created").map_err(|e| Error::Fatal(e.to_string()))? as u64,
            chunks_skipped: row.try_get::<i64, _>("chunks_skipped").map_err(|e| Error::Fatal(e.to_string()))? as u64,
            total_tokens_processed: row.try_get::<i64, _>("total_tokens_processed").map_err(|e| Error::Fatal(e.to_string()))? as u64,
            status: status_from_str(&status)?,
            retry_count: row.try_get::<i64, _>("retry_count").map_err(|e| Error::Fatal(e.to_string()))? as u32,
            last_checkpoint_at: row.try_get::<DateTime<Utc>, _>("last_checkpoint_at").map_err(|e| Error::Fatal(e.to_string()))?,
            serialized_state: row.try_get::<Option<Vec<u8>>, _>("serialized_state").map_err(|e| Error::Fatal(e.to_string()))?,
            error_message: row.try_get::<Option<String>, _>("error_message").map_err(|e| Error::Fatal(e.to_string()))?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(|e| Error::Fatal(e.to_string()))?,
        })
    }

    async fn upsert(&self, checkpoint: &JobCheckpoint) -> Result<()> {
        sqlx::query(
            "INSERT INTO job_checkpoints (\
                project_id, phase, last_processed_file_index, files_processed, chunks_indexed, \
                embeddings_created, chunks_skipped, total_tokens_processed, status, retry_count, \
                last_checkpoint_at, serialized_state, error_message, created_at\
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)\
            ON CONFLICT(project_id) DO UPDATE SET \
                phase = excluded.phase, \
                last_processed_file_index = excluded.last_processed_file_index, \
                files_processed = excluded.files_processed, \
                chunks_indexed = excluded.chunks_indexed, \
                embeddings_created = excluded.embeddings_created, \
                chunks_skipped = excluded.chunks_skipped, \
                total_tokens_processed = excluded.total_tokens_processed, \
                status = excluded.status, \
                retry_count = excluded.retry_count, \
                last_checkpoint_at = excluded.last_checkpoint_at, \
                serialized_state = excluded.serialized_state, \
                error_message = excluded.error_message",
        )
        .bind(checkpoint.project_id.0)
        .bind(phase_to_str(checkpoint.phase))
        .bind(checkpoint.last_processed_file_index as i64)
        .bind(checkpoint.files_processed as i64)
        .bind(checkpoint.chunks_indexed as i64)
        .bind(checkpoint.embeddings_created as i64)
        .bind(checkpoint.chunks_skipped as i64)
        .bind(checkpoint.total_tokens_processed as i64)
        .bind(status_to_str(checkpoint.status))
        .bind(checkpoint.retry_count as i64)
        .bind(checkpoint.last_checkpoint_at)
        .bind(checkpoint.serialized_state.clone())
        .bind(checkpoint.error_message.clone())
        .bind(checkpoint.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Fatal(format!("failed to persist checkpoint: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl CheckpointStore for SqliteCheckpointStore {
    async fn get(&self, project_id: ProjectId) -> Result<Option<JobCheckpoint>> {
        let row = sqlx::query("SELECT * FROM job_checkpoints WHERE project_id = ?")
            .bind(project_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Fatal(format!("failed to fetch checkpoint: {e}")))?;
        row.as_ref().map(Self::row_to_checkpoint).transpose()
    }

    async fn get_by_status(&self, status: CheckpointStatus) -> Result<Vec<JobCheckpoint>> {
        let rows = sqlx::query("SELECT * FROM job_checkpoints WHERE status = ?")
            .bind(status_to_str(status))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::Fatal(format!("failed to fetch checkpoints by status: {e}")))?;
        rows.iter().map(Self::row_to_checkpoint).collect()
    }

    async fn get_pending_retry(&self, max_retries: u32) -> Result<Vec<JobCheckpoint>> {
        let rows = sqlx::query("SELECT * FROM job_checkpoints WHERE status = ? AND retry_count < ?")
            .bind(status_to_str(CheckpointStatus::PendingRetry))
            .bind(i64::from(max_retries))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::Fatal(format!("failed to fetch pending-retry checkpoints: {e}")))?;
        rows.iter().map(Self::row_to_checkpoint).collect()
    }

    async fn add(&self, checkpoint: &JobCheckpoint) -> Result<()> {
        self.upsert(checkpoint).await
    }

    async fn update(&self, checkpoint: &JobCheckpoint) -> Result<()> {
        self.upsert(checkpoint).await
    }

    async fn delete_by_project(&self, project_id: ProjectId) -> Result<()> {
        sqlx::query("DELETE FROM job_checkpoints WHERE project_id = ?")
            .bind(project_id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Fatal(format!("failed to delete checkpoint: {e}")))?;
        Ok(())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM job_checkpoints WHERE last_checkpoint_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Fatal(format!("failed to prune checkpoints: {e}")))?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteCheckpointStore {
        SqliteCheckpointStore::connect("sqlite::memory:", 1).await.unwrap()
    }

    #[tokio::test]
    async fn round_trips_a_checkpoint() {
        let store = store().await;
        let project_id = ProjectId::new();
        let checkpoint = JobCheckpoint::new(project_id);
        store.add(&checkpoint).await.unwrap();

        let fetched = store.get(project_id).await.unwrap().unwrap();
        assert_eq!(fetched.project_id, project_id);
        assert_eq!(fetched.phase, CheckpointPhase::NotStarted);
        assert_eq!(fetched.status, CheckpointStatus::Pending);
    }

    #[tokio::test]
    async fn update_overwrites_existing_row() {
        let store = store().await;
        let project_id = ProjectId::new();
        let mut checkpoint = JobCheckpoint::new(project_id);
        store.add(&checkpoint).await.unwrap();

        checkpoint.advance_phase(CheckpointPhase::Chunking).unwrap();
        checkpoint.files_processed = 10;
        store.update(&checkpoint).await.unwrap();

        let fetched = store.get(project_id).await.unwrap().unwrap();
        assert_eq!(fetched.phase, CheckpointPhase::Chunking);
        assert_eq!(fetched.files_processed, 10);
    }

    #[tokio::test]
    async fn get_by_status_filters_correctly() {
        let store = store().await;
        let mut failing = JobCheckpoint::new(ProjectId::new());
        failing.mark_failed("boom", 3);
        store.add(&failing).await.unwrap();
        store.add(&JobCheckpoint::new(ProjectId::new())).await.unwrap();

        let pending_retry = store.get_by_status(CheckpointStatus::PendingRetry).await.unwrap();
        assert_eq!(pending_retry.len(), 1);
    }

    #[tokio::test]
    async fn delete_by_project_removes_row() {
        let store = store().await;
        let project_id = ProjectId::new();
        store.add(&JobCheckpoint::new(project_id)).await.unwrap();
        store.delete_by_project(project_id).await.unwrap();
        assert!(store.get(project_id).await.unwrap().is_none());
    }
}
