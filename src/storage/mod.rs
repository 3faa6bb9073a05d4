//! Storage backends for the app collection and icon blobs

mod filesystem;
mod traits;

pub use filesystem::{FilesystemBlobStore, FilesystemStore};
pub use traits::{AppStore, BlobStore, StoreError};
