//! Concurrency Limiter (§4.8): bounded, cancellable semaphores for the
//! three named resource pools, grounded on the `Arc<Semaphore>` fan-out
//! pattern used by the enrichment repo's agent orchestrator.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use warden_domain::error::{Error, Result};
use warden_domain::ports::{ConcurrencyLimiter, SlotGuard, SlotKind};

struct TokioSlotGuard {
    _permit: OwnedSemaphorePermit,
}

impl SlotGuard for TokioSlotGuard {}

struct NamedSlot {
    semaphore: Arc<Semaphore>,
    waiting: AtomicUsize,
}

impl NamedSlot {
    fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            waiting: AtomicUsize::new(0),
        }
    }
}

/// `tokio::sync::Semaphore`-backed implementation of the three named
/// slots (Embedding / Reasoning / FileRead).
pub struct TokioConcurrencyLimiter {
    embedding: NamedSlot,
    reasoning: NamedSlot,
    file_read: NamedSlot,
}

impl TokioConcurrencyLimiter {
    /// Builds a limiter with the given per-pool capacities.
    #[must_use]
    pub fn new(embedding: usize, reasoning: usize, file_read: usize) -> Self {
        Self {
            embedding: NamedSlot::new(embedding),
            reasoning: NamedSlot::new(reasoning),
            file_read: NamedSlot::new(file_read),
        }
    }

    fn slot(&self, kind: SlotKind) -> &NamedSlot {
        match kind {
            SlotKind::Embedding => &self.embedding,
            SlotKind::Reasoning => &self.reasoning,
            SlotKind::FileRead => &self.file_read,
        }
    }
}

#[async_trait]
impl ConcurrencyLimiter for TokioConcurrencyLimiter {
    async fn acquire(&self, kind: SlotKind) -> Result<Box<dyn SlotGuard>> {
        let slot = self.slot(kind);
        slot.waiting.fetch_add(1, Ordering::SeqCst);
        let result = Arc::clone(&slot.semaphore).acquire_owned().await;
        slot.waiting.fetch_sub(1, Ordering::SeqCst);
        match result {
            Ok(permit) => Ok(Box::new(TokioSlotGuard { _permit: permit })),
            Err(_) => Err(Error::Cancelled {
                reason: format!("{kind:?} semaphore closed"),
            }),
        }
    }

    fn queue_depth(&self, kind: SlotKind) -> usize {
        self.slot(kind).waiting.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_bounds_concurrent_holders() {
        let limiter = Arc::new(TokioConcurrencyLimiter::new(2, 1, 1));
        let g1 = limiter.acquire(SlotKind::Embedding).await.unwrap();
        let g2 = limiter.acquire(SlotKind::Embedding).await.unwrap();

        let limiter_clone = Arc::clone(&limiter);
        let handle = tokio::spawn(async move { limiter_clone.acquire(SlotKind::Embedding).await });
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!handle.is_finished());

        drop(g1);
        let g3 = handle.await.unwrap().unwrap();
        drop(g2);
        drop(g3);
    }

    #[tokio::test]
    async fn queue_depth_reflects_waiters() {
        let limiter = Arc::new(TokioConcurrencyLimiter::new(1, 1, 1));
        let _held = limiter.acquire(SlotKind::Reasoning).await.unwrap();
        let limiter_clone = Arc::clone(&limiter);
        let handle = tokio::spawn(async move { limiter_clone.acquire(SlotKind::Reasoning).await });
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(limiter.queue_depth(SlotKind::Reasoning), 1);
        drop(_held);
        let _ = handle.await;
    }
}
