use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::project::ProjectId;

/// Priority of an inbound job message, honored in dequeue ordering (ties
/// broken by `enqueued_at`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JobPriority {
    /// Lowest priority.
    Low,
    /// Default priority.
    Normal,
    /// Elevated priority.
    High,
    /// Highest priority.
    Critical,
}

/// The kind of durable job. Only `Analysis` is recognized by this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobType {
    /// A full analysis run.
    Analysis,
}

/// Inbound job message shape, matching §6's wire contract verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMessage {
    /// Unique message identifier.
    pub job_id: Uuid,
    /// Project this job operates on.
    pub project_id: ProjectId,
    /// Always `Analysis` in this core.
    pub job_type: JobType,
    /// Dequeue priority.
    pub priority: JobPriority,
    /// Number of times this message has been delivered.
    pub delivery_count: u32,
    /// When the message was first enqueued.
    pub enqueued_at: DateTime<Utc>,
    /// Scheduled earliest-delivery time, for delayed retry.
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Correlation id for cross-system tracing.
    pub correlation_id: Option<String>,
    /// Opaque metadata bag.
    pub metadata: std::collections::HashMap<String, String>,
}
