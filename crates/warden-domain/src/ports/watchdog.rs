use tokio_util::sync::CancellationToken;

use crate::entities::ProjectId;

/// Heartbeat tracker that cancels stuck operations (§4.11).
pub trait Watchdog: Send + Sync {
    /// Registers a project's job, linking `cancellation` so the watchdog
    /// can request cancellation if the job goes stuck.
    fn register(&self, project_id: ProjectId, cancellation: CancellationToken);

    /// Records a heartbeat for `project_id` with the current phase string.
    fn heartbeat(&self, project_id: ProjectId, phase: &str);

    /// Marks `project_id` complete, removing its registration.
    fn complete(&self, project_id: ProjectId);
}
