use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::Context;
use axum::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

/// Storage for uploaded photos, keyed by the generated filename. Files are
/// write-once: a put never overwrites an existing file.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    async fn put(&self, filename: &str, body: Bytes) -> anyhow::Result<()>;
    /// Returns false when no file with that name existed.
    async fn delete(&self, filename: &str) -> anyhow::Result<bool>;
}

/// Extracts the stored filename from a photo reference, accepting only
/// references under the local uploads prefix. External URLs and anything
/// containing path separators yield None.
pub fn local_photo_filename(reference: &str) -> Option<&str> {
    let filename = reference.strip_prefix("/uploads/")?;
    if filename.is_empty() || filename.contains('/') || filename.contains('\\') {
        return None;
    }
    Some(filename)
}

/// Filesystem store rooted at the configured uploads directory.
pub struct FsPhotoStore {
    root: PathBuf,
}

impl FsPhotoStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl PhotoStore for FsPhotoStore {
    async fn put(&self, filename: &str, body: Bytes) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("create uploads dir {}", self.root.display()))?;
        let path = self.root.join(filename);
        // create_new keeps the location write-once.
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .with_context(|| format!("create {}", path.display()))?;
        file.write_all(&body).await?;
        file.flush().await?;
        Ok(())
    }

    async fn delete(&self, filename: &str) -> anyhow::Result<bool> {
        let path = self.root.join(filename);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("delete {}", path.display())),
        }
    }
}

/// In-memory photo store backing tests.
#[derive(Default)]
pub struct MemoryPhotoStore {
    files: RwLock<HashMap<String, Bytes>>,
}

impl MemoryPhotoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn contains(&self, filename: &str) -> bool {
        self.files.read().await.contains_key(filename)
    }
}

#[async_trait]
impl PhotoStore for MemoryPhotoStore {
    async fn put(&self, filename: &str, body: Bytes) -> anyhow::Result<()> {
        let mut files = self.files.write().await;
        if files.contains_key(filename) {
            anyhow::bail!("file already exists: {filename}");
        }
        files.insert(filename.to_string(), body);
        Ok(())
    }

    async fn delete(&self, filename: &str) -> anyhow::Result<bool> {
        Ok(self.files.write().await.remove(filename).is_some())
    }
}
