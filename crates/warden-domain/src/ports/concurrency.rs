use async_trait::async_trait;

use crate::error::Result;

/// The three named resource pools bounded by the Concurrency Limiter
/// (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// Embedding calls.
    Embedding,
    /// Reasoning (LLM analysis) calls.
    Reasoning,
    /// File read operations.
    FileRead,
}

/// An acquired slot; releases on drop, covering every exit path including
/// cancellation and panics unwinding through the guard.
pub trait SlotGuard: Send {}

/// Bounded, cancellable semaphore-style acquisition for the three named
/// resource pools (§4.8, §5).
#[async_trait]
pub trait ConcurrencyLimiter: Send + Sync {
    /// Acquires one slot of `kind`, waiting if none are free.
    ///
    /// This future carries no cancellation context of its own: callers
    /// that must honor a job's cancellation token race this call against
    /// it with `tokio::select!`, so dropping the losing branch drops the
    /// acquire future before it registers a slot. Returns
    /// [`crate::Error::Cancelled`] only if the limiter itself is shutting
    /// down.
    ///
    /// # Errors
    /// Returns [`crate::Error::Cancelled`] if the limiter is closed while
    /// waiting for a slot.
    async fn acquire(&self, kind: SlotKind) -> Result<Box<dyn SlotGuard>>;

    /// Current count of callers waiting on `kind`.
    fn queue_depth(&self, kind: SlotKind) -> usize;
}
