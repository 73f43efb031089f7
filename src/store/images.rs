//! Product images on the local filesystem, served under a public base URL.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::{ImageStore, StoreError};
use crate::domain::value_objects::ImagePath;

#[derive(Clone, Debug)]
pub struct LocalImageStore {
    root: PathBuf,
    base_url: String,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self { root: root.into(), base_url: base_url.trim_end_matches('/').to_string() }
    }

    pub fn public_url(&self, path: &ImagePath) -> String { format!("{}/{}", self.base_url, path) }

    fn resolve(&self, path: &ImagePath) -> PathBuf { self.root.join(path.as_str()) }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn upload(&self, path: &ImagePath, bytes: Vec<u8>) -> Result<String, StoreError> {
        let target = self.resolve(path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = match tokio::fs::OpenOptions::new().write(true).create_new(true).open(&target).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Err(StoreError::Conflict),
            Err(e) => return Err(e.into()),
        };
        write_or_discard(&target, file, &bytes).await?;
        tracing::debug!(path = %path, size = bytes.len(), "image stored");
        Ok(self.public_url(path))
    }

    async fn remove(&self, path: &ImagePath) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.resolve(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}

/// Writes `bytes` to a freshly created `target`. On failure the partial file
/// is removed so the same path can be uploaded again.
async fn write_or_discard<W>(target: &Path, mut out: W, bytes: &[u8]) -> Result<(), StoreError>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        out.write_all(bytes).await?;
        out.flush().await
    }
    .await;
    drop(out);
    if let Err(e) = written {
        if let Err(cleanup) = tokio::fs::remove_file(target).await {
            tracing::warn!(error = %cleanup, path = %target.display(), "partial image left behind");
        }
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    struct DiskFull;

    impl AsyncWrite for DiskFull {
        fn poll_write(self: Pin<&mut Self>, _: &mut Context<'_>, _: &[u8]) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, "no space left on device")))
        }
        fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> { Poll::Ready(Ok(())) }
        fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> { Poll::Ready(Ok(())) }
    }

    #[tokio::test]
    async fn test_failed_write_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path(), "/images");
        let path = ImagePath::new("pamonha.png").unwrap();
        let target = dir.path().join("pamonha.png");
        std::fs::write(&target, [1]).unwrap();

        let err = write_or_discard(&target, DiskFull, &[1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(!target.exists());
        assert_eq!(store.upload(&path, vec![4, 5]).await.unwrap(), "/images/pamonha.png");
        assert_eq!(std::fs::read(&target).unwrap(), vec![4, 5]);
    }

    #[tokio::test]
    async fn test_upload_returns_public_url_and_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path(), "https://stall.example/images/");
        let path = ImagePath::new("doces/canjica.png").unwrap();

        let url = store.upload(&path, vec![1, 2, 3]).await.unwrap();
        assert_eq!(url, "https://stall.example/images/doces/canjica.png");
        assert_eq!(std::fs::read(dir.path().join("doces/canjica.png")).unwrap(), vec![1, 2, 3]);
        assert!(matches!(store.upload(&path, vec![9]).await, Err(StoreError::Conflict)));
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path(), "/images");
        let path = ImagePath::new("milho.jpg").unwrap();
        store.upload(&path, vec![0]).await.unwrap();
        store.remove(&path).await.unwrap();
        assert!(matches!(store.remove(&path).await, Err(StoreError::NotFound)));
    }
}
