//! Object-store boundary for the world snapshot.
//!
//! The supervisor keeps a single archive object per server, identified by a
//! fixed `(bucket, key)` pair. The store distinguishes "the object does not
//! exist yet" (a normal first-run condition) from every other failure.

mod s3;

pub use s3::{S3BackupStore, S3Settings};

use async_trait::async_trait;
use thiserror::Error;

/// Content type tagged onto every uploaded archive.
pub const ARCHIVE_CONTENT_TYPE: &str = "application/gzip";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("bucket {bucket} unavailable: {message}")]
    Bucket { bucket: String, message: String },

    #[error("archive upload failed: {0}")]
    Upload(String),

    #[error("archive download failed: {0}")]
    Download(String),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Checks that the backup bucket exists, creating it when absent.
    async fn ensure_bucket(&self) -> Result<(), StoreError>;

    /// Uploads the archive under the fixed key, overwriting any prior object.
    async fn put_archive(&self, data: Vec<u8>) -> Result<(), StoreError>;

    /// Downloads the archive under the fixed key. `Ok(None)` means the object
    /// does not exist yet.
    async fn fetch_archive(&self) -> Result<Option<Vec<u8>>, StoreError>;
}

#[async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for std::sync::Arc<T> {
    async fn ensure_bucket(&self) -> Result<(), StoreError> {
        (**self).ensure_bucket().await
    }

    async fn put_archive(&self, data: Vec<u8>) -> Result<(), StoreError> {
        (**self).put_archive(data).await
    }

    async fn fetch_archive(&self) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).fetch_archive().await
    }
}
