use async_trait::async_trait;

use crate::entities::JobMessage;
use crate::error::Result;

/// Durable queue dequeue contract (§6): visibility timeout, complete,
/// abandon, dead-letter. The spec treats the queue itself as an external
/// collaborator; this port lets the worker's consumer loop be exercised
/// against an in-process adapter in tests.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Dequeues the next message honoring priority (ties by
    /// `enqueued_at`), holding it invisible to other consumers for
    /// `visibility_timeout_secs`. Returns `None` if no message is ready.
    ///
    /// # Errors
    /// Returns an error for transport failures.
    async fn dequeue(&self, visibility_timeout_secs: u64) -> Result<Option<JobMessage>>;

    /// Acknowledges successful processing, removing the message.
    ///
    /// # Errors
    /// Returns an error for transport failures.
    async fn complete(&self, job_id: uuid::Uuid) -> Result<()>;

    /// Returns the message to the queue for redelivery.
    ///
    /// # Errors
    /// Returns an error for transport failures.
    async fn abandon(&self, job_id: uuid::Uuid) -> Result<()>;

    /// Moves the message to the dead-letter destination.
    ///
    /// # Errors
    /// Returns an error for transport failures.
    async fn dead_letter(&self, job_id: uuid::Uuid, reason: &str) -> Result<()>;
}
