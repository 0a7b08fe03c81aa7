//! Job Queue (§6): an in-process adapter over the `JobQueue` port.
//! Honors priority (ties by `enqueued_at`) and a per-message visibility
//! timeout, matching the wire contract the spec treats as an external
//! collaborator.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;
use warden_domain::entities::JobMessage;
use warden_domain::error::{Error, Result};
use warden_domain::ports::JobQueue;

struct InFlight {
    message: JobMessage,
    visible_at: chrono::DateTime<Utc>,
}

/// In-process priority queue with delivery-count tracking and a
/// dead-letter sink, for single-worker deployments and tests.
#[derive(Default)]
pub struct InMemoryJobQueue {
    ready: Mutex<Vec<JobMessage>>,
    in_flight: Mutex<HashMap<Uuid, InFlight>>,
    dead_letters: Mutex<Vec<(JobMessage, String)>>,
}

impl InMemoryJobQueue {
    /// Builds an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a new message for later dequeue.
    pub fn enqueue(&self, message: JobMessage) {
        self.ready.lock().expect("queue mutex poisoned").push(message);
    }

    /// Number of dead-lettered messages, for diagnostics/tests.
    #[must_use]
    pub fn dead_letter_count(&self) -> usize {
        self.dead_letters.lock().expect("queue mutex poisoned").len()
    }

    fn requeue_expired(&self) {
        let now = Utc::now();
        let mut in_flight = self.in_flight.lock().expect("queue mutex poisoned");
        let expired: Vec<Uuid> = in_flight.iter().filter(|(_, f)| f.visible_at <= now).map(|(id, _)| *id).collect();
        let mut ready = self.ready.lock().expect("queue mutex poisoned");
        for id in expired {
            if let Some(flight) = in_flight.remove(&id) {
                ready.push(flight.message);
            }
        }
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn dequeue(&self, visibility_timeout_secs: u64) -> Result<Option<JobMessage>> {
        self.requeue_expired();

        let mut ready = self.ready.lock().expect("queue mutex poisoned");
        if ready.is_empty() {
            return Ok(None);
        }

        let best_index = ready
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.priority.cmp(&b.priority).then(b.enqueued_at.cmp(&a.enqueued_at)))
            .map(|(idx, _)| idx)
            .expect("checked non-empty above");

        let mut message = ready.remove(best_index);
        message.delivery_count += 1;

        let visible_at = Utc::now() + chrono::Duration::seconds(visibility_timeout_secs as i64);
        self.in_flight.lock().expect("queue mutex poisoned").insert(
            message.job_id,
            InFlight {
                message: message.clone(),
                visible_at,
            },
        );

        Ok(Some(message))
    }

    async fn complete(&self, job_id: Uuid) -> Result<()> {
        self.in_flight.lock().expect("queue mutex poisoned").remove(&job_id);
        Ok(())
    }

    async fn abandon(&self, job_id: Uuid) -> Result<()> {
        let mut in_flight = self.in_flight.lock().expect("queue mutex poisoned");
        if let Some(flight) = in_flight.remove(&job_id) {
            self.ready.lock().expect("queue mutex poisoned").push(flight.message);
            Ok(())
        } else {
            Err(Error::Fatal(format!("abandon: job {job_id} is not in flight")))
        }
    }

    async fn dead_letter(&self, job_id: Uuid, reason: &str) -> Result<()> {
        let mut in_flight = self.in_flight.lock().expect("queue mutex poisoned");
        if let Some(flight) = in_flight.remove(&job_id) {
            self.dead_letters.lock().expect("queue mutex poisoned").push((flight.message, reason.to_string()));
            Ok(())
        } else {
            Err(Error::Fatal(format!("dead_letter: job {job_id} is not in flight")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_domain::entities::{JobPriority, JobType};
    use warden_domain::entities::ProjectId;

    fn message(priority: JobPriority) -> JobMessage {
        JobMessage {
            job_id: Uuid::new_v4(),
            project_id: ProjectId::new(),
            job_type: JobType::Analysis,
            priority,
            delivery_count: 0,
            enqueued_at: Utc::now(),
            scheduled_for: None,
            correlation_id: None,
            metadata: std::collections::HashMap::new(),
        }
    }

    #[tokio::test]
    async fn dequeue_honors_priority() {
        let queue = InMemoryJobQueue::new();
        queue.enqueue(message(JobPriority::Low));
        queue.enqueue(message(JobPriority::Critical));
        queue.enqueue(message(JobPriority::Normal));

        let first = queue.dequeue(30).await.unwrap().unwrap();
        assert_eq!(first.priority, JobPriority::Critical);
    }

    #[tokio::test]
    async fn complete_removes_in_flight_message() {
        let queue = InMemoryJobQueue::new();
        queue.enqueue(message(JobPriority::Normal));
        let msg = queue.dequeue(30).await.unwrap().unwrap();
        queue.complete(msg.job_id).await.unwrap();
        assert!(queue.abandon(msg.job_id).await.is_err());
    }

    #[tokio::test]
    async fn abandon_requeues_for_redelivery() {
        let queue = InMemoryJobQueue::new();
        queue.enqueue(message(JobPriority::Normal));
        let msg = queue.dequeue(30).await.unwrap().unwrap();
        queue.abandon(msg.job_id).await.unwrap();

        let redelivered = queue.dequeue(30).await.unwrap().unwrap();
        assert_eq!(redelivered.job_id, msg.job_id);
        assert_eq!(redelivered.delivery_count, 2);
    }

    #[tokio::test]
    async fn dead_letter_records_reason() {
        let queue = InMemoryJobQueue::new();
        queue.enqueue(message(JobPriority::Normal));
        let msg = queue.dequeue(30).await.unwrap().unwrap();
        queue.dead_letter(msg.job_id, "exhausted retries").await.unwrap();
        assert_eq!(queue.dead_letter_count(), 1);
    }
}
