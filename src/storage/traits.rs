//! Storage contract definitions for the app collection and icon blobs

use crate::types::{AppPatch, AppRecord};
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Ordered-collection store for app records.
///
/// Object-safe; handlers hold it as `Arc<dyn AppStore>`.
#[async_trait]
pub trait AppStore: Send + Sync {
    /// All records, ordered by `order` ascending.
    async fn list_ordered(&self) -> Result<Vec<AppRecord>, StoreError>;

    /// Fetch a single record by id, `None` if absent.
    async fn get(&self, id: &str) -> Result<Option<AppRecord>, StoreError>;

    /// Insert a record (order and timestamps already assigned by the
    /// caller) and return the store-assigned id. Any id on the incoming
    /// record is replaced.
    async fn insert(&self, record: AppRecord) -> Result<String, StoreError>;

    /// Apply a partial update to one record.
    async fn update_fields(&self, id: &str, patch: &AppPatch) -> Result<(), StoreError>;

    /// Delete a record.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Apply several partial updates together, atomically: either all
    /// land or none do.
    async fn batch_update(&self, updates: &[(String, AppPatch)]) -> Result<(), StoreError>;
}

/// Blob store for uploaded icon images.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store the bytes and return a public URL for them.
    async fn upload(
        &self,
        data: Bytes,
        content_type: &str,
        file_name: &str,
    ) -> Result<String, StoreError>;

    /// Delete a previously uploaded blob by its public URL.
    /// A URL outside the managed prefix is ignored, not an error.
    async fn delete(&self, public_url: &str) -> Result<(), StoreError>;
}
