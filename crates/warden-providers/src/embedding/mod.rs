//! Embedding Client (§4.3): a local `fastembed` model and a deterministic
//! hash-based fallback, both returning L2-normalized vectors.

mod fastembed_provider;
mod hash_fallback;
mod resilient;

pub use fastembed_provider::FastEmbedProvider;
pub use hash_fallback::HashEmbeddingProvider;
pub use resilient::ResilientEmbeddingProvider;
