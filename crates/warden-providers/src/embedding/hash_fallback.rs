use async_trait::async_trait;
use sha2::{Digest, Sha256};
use warden_domain::error::Result;
use warden_domain::ports::EmbeddingProvider;

/// Deterministic, model-free embedding provider: hashes text into a
/// fixed-dimension vector and L2-normalizes it. Used in tests and in
/// environments with no downloaded model weights; never mistaken for a
/// semantically meaningful embedding.
pub struct HashEmbeddingProvider {
    dimension: usize,
}

impl HashEmbeddingProvider {
    /// Builds a provider producing `dimension`-length vectors.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimension];
        let mut counter: u32 = 0;
        while (counter as usize) * 32 < self.dimension {
            let mut hasher = Sha256::new();
            hasher.update(text.as_bytes());
            hasher.update(counter.to_le_bytes());
            let digest = hasher.finalize();
            for (i, byte) in digest.iter().enumerate() {
                let idx = counter as usize * 32 + i;
                if idx >= self.dimension {
                    break;
                }
                // map byte to [-1, 1]
                vector[idx] = (f32::from(*byte) / 127.5) - 1.0;
            }
            counter += 1;
        }

        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_one(text))
    }

    async fn generate_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "hash-fallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn vectors_are_l2_normalized() {
        let provider = HashEmbeddingProvider::new(384);
        let vector = provider.generate("hello world").await.unwrap();
        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() <= 1e-3);
    }

    #[tokio::test]
    async fn same_text_yields_same_vector() {
        let provider = HashEmbeddingProvider::new(128);
        let a = provider.generate("deterministic").await.unwrap();
        let b = provider.generate("deterministic").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn batch_preserves_order() {
        let provider = HashEmbeddingProvider::new(64);
        let texts = vec!["first".to_string(), "second".to_string()];
        let batch = provider.generate_batch(&texts).await.unwrap();
        let single_first = provider.generate("first").await.unwrap();
        assert_eq!(batch[0], single_first);
    }
}
