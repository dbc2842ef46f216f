//! Persisted state blobs.
//!
//! Three independent named blobs, each a JSON record:
//! - `app-storage`: preferences (theme only)
//! - `auth-storage`: signed-in user and flag
//! - `cv-storage`: saved CVs, saved letters and the version history
//!
//! Backends implement [`BlobStore`]; the service never touches a backend
//! directly outside of `Workspace`.

pub mod fs;
pub mod memory;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::models::cv::CvDocument;
use crate::models::letter::CoverLetter;
use crate::versions::VersionLedger;

pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;
pub use s3::S3BlobStore;

pub const PREFERENCES_KEY: &str = "app-storage";
pub const AUTH_KEY: &str = "auth-storage";
pub const LIBRARY_KEY: &str = "cv-storage";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns `None` when the blob has never been written.
    async fn load(&self, key: &str) -> Result<Option<Bytes>, StorageError>;

    async fn store(&self, key: &str, bytes: Bytes) -> Result<(), StorageError>;
}

/// Contents of the `cv-storage` blob.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Library {
    pub saved_cvs: Vec<CvDocument>,
    pub saved_letters: Vec<CoverLetter>,
    #[serde(flatten)]
    pub history: VersionLedger,
}

/// Reads and decodes a blob. A missing blob yields the default; an undecodable
/// one is logged and also yields the default so a corrupt file never blocks
/// start-up.
pub async fn load_or_default<T>(store: &dyn BlobStore, key: &str) -> Result<T, StorageError>
where
    T: DeserializeOwned + Default,
{
    let Some(bytes) = store.load(key).await? else {
        return Ok(T::default());
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(value),
        Err(e) => {
            warn!("Blob '{key}' is not valid, starting from defaults: {e}");
            Ok(T::default())
        }
    }
}

pub async fn store_json<T: Serialize>(
    store: &dyn BlobStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec(value)?;
    store.store(key, Bytes::from(bytes)).await
}
