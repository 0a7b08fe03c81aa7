//! Blob Store (§6): a filesystem-backed adapter storing each blob under
//! `root/container/name`. `content_type` is recorded alongside the payload
//! in a sidecar file since the plain filesystem carries no metadata.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use warden_domain::error::{Error, Result};
use warden_domain::ports::{BlobStore, ByteStream};

/// Stores blobs as plain files under a root directory.
pub struct FilesystemBlobStore {
    root: PathBuf,
}

impl FilesystemBlobStore {
    /// Builds a store rooted at `root`. The directory is not created
    /// eagerly; call [`Self::ensure_root`] first.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates the root directory (and parents) if missing.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub async fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await.map_err(Error::Io)
    }

    fn blob_path(&self, container: &str, name: &str) -> PathBuf {
        self.root.join(container).join(name)
    }

    fn sidecar_path(path: &Path) -> PathBuf {
        let mut sidecar = path.as_os_str().to_owned();
        sidecar.push(".content-type");
        PathBuf::from(sidecar)
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn upload(&self, container: &str, name: &str, mut stream: ByteStream, content_type: &str) -> Result<()> {
        let path = self.blob_path(container, name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(Error::Io)?;
        }

        let mut file = fs::File::create(&path).await.map_err(Error::Io)?;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(Error::Io)?;
            file.write_all(&chunk).await.map_err(Error::Io)?;
        }
        file.flush().await.map_err(Error::Io)?;

        fs::write(Self::sidecar_path(&path), content_type.as_bytes()).await.map_err(Error::Io)?;
        Ok(())
    }

    async fn download(&self, container: &str, name: &str) -> Result<ByteStream> {
        let path = self.blob_path(container, name);
        let file = fs::File::open(&path)
            .await
            .map_err(|e| Error::external_unavailable(format!("blob {container}/{name} not found: {e}")))?;
        let stream = ReaderStream::new(file).map(|chunk| chunk.map(|bytes| bytes.to_vec()));
        Ok(Box::pin(stream))
    }

    async fn delete(&self, container: &str, name: &str) -> Result<()> {
        let path = self.blob_path(container, name);
        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::Io(e)),
        }
        let _ = fs::remove_file(Self::sidecar_path(&path)).await;
        Ok(())
    }
}
