use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Durable home of the serialized record collection.
///
/// Backends move whole documents only; decoding and recovery live in the
/// record store.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Returns `None` when nothing has been persisted yet.
    async fn read(&self) -> anyhow::Result<Option<Vec<u8>>>;
    async fn write(&self, body: Vec<u8>) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn read(&self) -> anyhow::Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read {}", self.path.display())),
        }
    }

    async fn write(&self, body: Vec<u8>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create {}", parent.display()))?;
        }
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    body: Mutex<Option<Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: Mutex::new(Some(body.into())),
        }
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn read(&self) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.body.lock().await.clone())
    }

    async fn write(&self, body: Vec<u8>) -> anyhow::Result<()> {
        *self.body.lock().await = Some(body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_backend_reports_missing_file_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("db.json"));
        assert!(backend.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_backend_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("nested/deeper/db.json"));
        backend.write(b"{}".to_vec()).await.unwrap();
        assert_eq!(backend.read().await.unwrap().as_deref(), Some(&b"{}"[..]));
    }

    #[tokio::test]
    async fn memory_backend_keeps_last_write() {
        let backend = MemoryBackend::with_contents("first");
        backend.write(b"second".to_vec()).await.unwrap();
        assert_eq!(backend.read().await.unwrap().as_deref(), Some(&b"second"[..]));
    }
}
