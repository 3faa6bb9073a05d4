//! Filesystem-backed stores: a single JSON document for the app
//! collection, plus a flat icons directory for uploaded blobs.

use super::traits::{AppStore, BlobStore, StoreError};
use crate::types::{AppPatch, AppRecord};
use async_trait::async_trait;
use bytes::Bytes;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::debug;

/// Atomically write data to a file using write-to-temp + fsync + rename.
async fn atomic_write(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let parent = path
        .parent()
        .ok_or_else(|| StoreError::Unavailable("cannot write to a path with no parent".into()))?
        .to_path_buf();
    let path = path.to_path_buf();
    let data = data.to_vec();

    tokio::task::spawn_blocking(move || {
        let mut tmp = NamedTempFile::new_in(&parent)?;
        tmp.write_all(&data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(|e| StoreError::Unavailable(format!("spawn_blocking join failed: {}", e)))?
}

/// App collection stored as one JSON array in `{root}/apps.json`.
///
/// Every write rewrites the whole document atomically, which is what
/// makes `batch_update` a real multi-record transaction. A missing
/// document reads as an empty collection.
pub struct FilesystemStore {
    doc_path: PathBuf,
}

impl FilesystemStore {
    pub async fn new(root: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&root).await?;
        Ok(Self {
            doc_path: root.join("apps.json"),
        })
    }

    async fn load(&self) -> Result<Vec<AppRecord>, StoreError> {
        match fs::read(&self.doc_path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, records: &[AppRecord]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(records)?;
        atomic_write(&self.doc_path, &bytes).await
    }
}

#[async_trait]
impl AppStore for FilesystemStore {
    async fn list_ordered(&self) -> Result<Vec<AppRecord>, StoreError> {
        let mut records = self.load().await?;
        records.sort_by_key(|r| r.order);
        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<Option<AppRecord>, StoreError> {
        Ok(self.load().await?.into_iter().find(|r| r.id == id))
    }

    async fn insert(&self, mut record: AppRecord) -> Result<String, StoreError> {
        let mut records = self.load().await?;
        record.id = uuid::Uuid::new_v4().to_string();
        let id = record.id.clone();
        records.push(record);
        self.save(&records).await?;
        debug!("Inserted app {}", id);
        Ok(id)
    }

    async fn update_fields(&self, id: &str, patch: &AppPatch) -> Result<(), StoreError> {
        let mut records = self.load().await?;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch.apply(record);
        self.save(&records).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut records = self.load().await?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.save(&records).await
    }

    async fn batch_update(&self, updates: &[(String, AppPatch)]) -> Result<(), StoreError> {
        let mut records = self.load().await?;
        for (id, patch) in updates {
            let record = records
                .iter_mut()
                .find(|r| r.id == *id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            patch.apply(record);
        }
        // One atomic document rewrite: all updates land together.
        self.save(&records).await
    }
}

/// Icon blobs under `{root}/icons`, served publicly at `/icons/`.
pub struct FilesystemBlobStore {
    dir: PathBuf,
    public_prefix: String,
}

impl FilesystemBlobStore {
    pub async fn new(root: PathBuf) -> Result<Self, StoreError> {
        let dir = root.join("icons");
        fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            public_prefix: "/icons/".to_string(),
        })
    }

    /// Directory the static file service should expose at `/icons`.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Timestamp-prefixed name with anything outside `[A-Za-z0-9.]`
    /// flattened to `_`, so uploads never collide or escape the dir.
    fn blob_name(file_name: &str) -> String {
        let sanitized: String = file_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '_' })
            .collect();
        format!("{}_{}", chrono::Utc::now().timestamp_millis(), sanitized)
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn upload(
        &self,
        data: Bytes,
        content_type: &str,
        file_name: &str,
    ) -> Result<String, StoreError> {
        let name = Self::blob_name(file_name);
        atomic_write(&self.dir.join(&name), &data).await?;
        debug!(
            "Stored icon {} ({}, {} bytes)",
            name,
            content_type,
            data.len()
        );
        Ok(format!("{}{}", self.public_prefix, name))
    }

    async fn delete(&self, public_url: &str) -> Result<(), StoreError> {
        let Some(name) = public_url.strip_prefix(self.public_prefix.as_str()) else {
            debug!("Not a managed icon URL, skipping delete: {}", public_url);
            return Ok(());
        };
        // Reject anything that could step out of the icons dir.
        if name.is_empty() || name.contains('/') || name.contains("..") {
            return Ok(());
        }
        match fs::remove_file(self.dir.join(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
