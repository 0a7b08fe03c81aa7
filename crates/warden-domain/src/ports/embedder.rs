use async_trait::async_trait;

use crate::error::Result;

/// Batch text-to-vector embedding (§4.3). Vectors returned must be
/// L2-normalized within the spec's tolerance.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a single text.
    ///
    /// # Errors
    /// Returns an error for provider failures; callers are expected to run
    /// this through the Embedding resilience pipeline.
    async fn generate(&self, text: &str) -> Result<Vec<f32>>;

    /// Embeds a batch of texts, preserving input order in the result.
    ///
    /// # Errors
    /// Returns an error for provider failures.
    async fn generate_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Dimension of vectors this provider returns.
    fn dimension(&self) -> usize;

    /// Identifying model name, used in vector-store collection setup and
    /// diagnostics.
    fn model_name(&self) -> &str;
}
