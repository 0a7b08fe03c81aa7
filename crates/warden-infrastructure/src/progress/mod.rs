//! Progress Channel (§4.13): per-project pub/sub over `tokio::sync::broadcast`,
//! grounded on the teacher's `events::broadcast` event-bus pattern.

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;
use warden_domain::entities::ProjectId;
use warden_domain::ports::{ProgressChannel, ProgressEvent};

/// Per-project channel capacity; a slow subscriber that falls behind by
/// more than this many events will observe a `RecvError::Lagged` on its
/// next `recv`, consistent with the spec's at-least-once (not
/// exactly-once) delivery semantics.
const CHANNEL_CAPACITY: usize = 256;

/// Broadcast-backed progress channel. One `broadcast::Sender` per
/// project, created lazily on first publish or subscribe.
pub struct BroadcastProgressChannel {
    senders: DashMap<ProjectId, broadcast::Sender<ProgressEvent>>,
}

impl Default for BroadcastProgressChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastProgressChannel {
    /// Builds an empty channel registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            senders: DashMap::new(),
        }
    }

    fn sender_for(&self, project_id: ProjectId) -> broadcast::Sender<ProgressEvent> {
        self.senders
            .entry(project_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Drops the sender for `project_id`, releasing channel resources
    /// once a job completes and no more events will be published.
    pub fn teardown(&self, project_id: ProjectId) {
        self.senders.remove(&project_id);
    }
}

impl ProgressChannel for BroadcastProgressChannel {
    fn publish(&self, event: ProgressEvent) {
        let project_id = event.project_id();
        let sender = self.sender_for(project_id);
        // No subscribers is not an error: at-least-once delivery only
        // binds subscribers that exist at publish time.
        if sender.send(event).is_err() {
            debug!(project_id = %project_id, "no subscribers for progress event");
        }
    }

    fn subscribe(&self, project_id: ProjectId) -> broadcast::Receiver<ProgressEvent> {
        self.sender_for(project_id).subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_domain::ports::{JobCompletion, ProgressEvent};

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let channel = BroadcastProgressChannel::new();
        let project_id = ProjectId::new();
        let mut receiver = channel.subscribe(project_id);

        channel.publish(ProgressEvent::Completion(JobCompletion {
            project_id,
            is_success: true,
            report_id: None,
            error_kind: None,
        }));

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.project_id(), project_id);
    }

    #[tokio::test]
    async fn events_for_other_projects_are_not_delivered() {
        let channel = BroadcastProgressChannel::new();
        let project_a = ProjectId::new();
        let project_b = ProjectId::new();
        let mut receiver_a = channel.subscribe(project_a);

        channel.publish(ProgressEvent::Completion(JobCompletion {
            project_id: project_b,
            is_success: true,
            report_id: None,
            error_kind: None,
        }));

        assert!(receiver_a.try_recv().is_err());
    }
}
