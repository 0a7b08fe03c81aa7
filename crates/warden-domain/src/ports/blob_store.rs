use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::error::Result;

/// A stream of raw bytes, used for upload/download payloads.
pub type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Vec<u8>>> + Send>>;

/// Blob storage abstraction (§6): upload/download/delete of opaque byte
/// payloads, addressed by `(container, name)`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Uploads `stream` under `(container, name)`, tagging it with
    /// `content_type`.
    ///
    /// # Errors
    /// Returns an error for provider failures.
    async fn upload(&self, container: &str, name: &str, stream: ByteStream, content_type: &str) -> Result<()>;

    /// Downloads the blob at `(container, name)`.
    ///
    /// # Errors
    /// Returns an error if the blob does not exist or the provider fails.
    async fn download(&self, container: &str, name: &str) -> Result<ByteStream>;

    /// Deletes the blob at `(container, name)`.
    ///
    /// # Errors
    /// Returns an error for provider failures.
    async fn delete(&self, container: &str, name: &str) -> Result<()>;
}
