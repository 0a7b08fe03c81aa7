use std::sync::Arc;

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tokio::sync::Mutex;
use warden_domain::error::{Error, Result};
use warden_domain::ports::EmbeddingProvider;

const DEFAULT_INTERNAL_BATCH_SIZE: usize = 16;

fn normalize(vector: &mut [f32]) {
    let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for value in vector.iter_mut() {
            *value /= magnitude;
        }
    }
}

/// `fastembed`-backed local embedding provider (ONNX runtime, no network
/// call per request). Model inference is CPU-bound and blocking, so calls
/// run on `tokio::task::spawn_blocking`.
pub struct FastEmbedProvider {
    model: Arc<Mutex<TextEmbedding>>,
    dimension: usize,
    model_name: &'static str,
}

impl FastEmbedProvider {
    /// Loads the default local model (`AllMiniLML6V2`, 384 dimensions),
    /// downloading weights on first use if not already cached.
    ///
    /// # Errors
    /// Returns an error if model initialization fails (missing weights,
    /// unsupported platform, corrupt cache).
    pub fn try_new_default() -> Result<Self> {
        let model = TextEmbedding::try_new(InitOptions::new(EmbeddingModel::AllMiniLML6V2))
            .map_err(|e| Error::Fatal(format!("failed to initialize fastembed model: {e}")))?;
        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            dimension: 384,
            model_name: "AllMiniLML6V2",
        })
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.generate_batch(std::slice::from_ref(&text.to_string())).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| Error::Fatal("fastembed returned no vectors for a single-text batch".to_string()))
    }

    async fn generate_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let model = Arc::clone(&self.model);
        let texts = texts.to_vec();
        let mut vectors = tokio::task::spawn_blocking(move || {
            let model = model.blocking_lock();
            model.embed(texts, Some(DEFAULT_INTERNAL_BATCH_SIZE))
        })
        .await
        .map_err(|e| Error::Fatal(format!("fastembed task panicked: {e}")))?
        .map_err(|e| Error::external_unavailable(format!("fastembed inference failed: {e}")))?;

        for vector in &mut vectors {
            normalize(vector);
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        self.model_name
    }
}
