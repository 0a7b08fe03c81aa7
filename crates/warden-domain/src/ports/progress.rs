use chrono::{DateTime, Utc};

use crate::entities::{ProjectId, ReviewFinding};
use crate::error::ErrorKind;

/// `ProgressUpdate` event (§4.13).
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Project this update concerns.
    pub project_id: ProjectId,
    /// Short human-readable phase string (the heartbeat phase, §4.10).
    pub phase: String,
    /// Overall progress estimate in `[0, 100]`.
    pub progress_percent: f32,
    /// File currently being processed, if applicable.
    pub current_file: Option<String>,
    /// Files processed so far.
    pub files_processed: u64,
    /// Total files in the plan.
    pub total_files: u64,
}

/// `PartialFinding` event (§4.13).
#[derive(Debug, Clone)]
pub struct PartialFinding {
    /// Project this finding concerns.
    pub project_id: ProjectId,
    /// The finding itself.
    pub finding: ReviewFinding,
    /// When the finding was produced.
    pub timestamp: DateTime<Utc>,
}

/// `JobCompletion` event (§4.13).
#[derive(Debug, Clone)]
pub struct JobCompletion {
    /// Project this completion concerns.
    pub project_id: ProjectId,
    /// Whether the run succeeded.
    pub is_success: bool,
    /// The generated report's id, on success.
    pub report_id: Option<uuid::Uuid>,
    /// Classification of the failure, on failure.
    pub error_kind: Option<ErrorKind>,
}

/// The three progress-channel event shapes (§4.13).
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// See [`ProgressUpdate`].
    Progress(ProgressUpdate),
    /// See [`PartialFinding`].
    Finding(PartialFinding),
    /// See [`JobCompletion`].
    Completion(JobCompletion),
}

impl ProgressEvent {
    /// The `project_id` every event variant carries.
    #[must_use]
    pub fn project_id(&self) -> ProjectId {
        match self {
            Self::Progress(e) => e.project_id,
            Self::Finding(e) => e.project_id,
            Self::Completion(e) => e.project_id,
        }
    }
}

/// Publish/subscribe channel for progress events, scoped per project
/// (§4.13). Delivery is at-least-once; ordering within one `project_id` is
/// FIFO on the producer side, but subscribers must tolerate reordering.
pub trait ProgressChannel: Send + Sync {
    /// Publishes `event` to all current subscribers of its project.
    fn publish(&self, event: ProgressEvent);

    /// Subscribes to events for `project_id`, returning a receiver that
    /// will observe events published after this call (no event replay).
    fn subscribe(&self, project_id: ProjectId) -> tokio::sync::broadcast::Receiver<ProgressEvent>;
}
