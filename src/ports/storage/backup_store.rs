use crate::domain::{
    errors::{StorageError, StorageResult},
    models::BackupObject,
    value_objects::{BucketName, ObjectKey},
};
use async_trait::async_trait;
use bytes::Bytes;

/// Port for the object storage holding the backups
/// This abstracts the actual storage backend (S3, MinIO, in-memory, ...)
#[async_trait]
pub trait BackupStore: Send + Sync + 'static {
    /// List every backup whose key starts with `prefix`
    ///
    /// Directory markers (console-created "folder" objects) are not backups
    /// and are left out. Pagination is handled by the implementation.
    async fn list_backups(&self, prefix: &str) -> StorageResult<Vec<BackupObject>>;

    /// Delete the given keys, reporting one outcome per key
    ///
    /// A failure for one key never stops the others from being attempted.
    async fn delete_backups(&self, keys: &[ObjectKey]) -> Vec<DeletionOutcome>;
}

/// Port for fetching the retention policy document from object storage
#[async_trait]
pub trait ConfigDocumentStore: Send + Sync + 'static {
    /// Read the whole document stored at `bucket`/`key`
    async fn fetch_document(&self, bucket: &BucketName, key: &ObjectKey) -> StorageResult<Bytes>;
}

/// Result of deleting a single backup
#[derive(Debug, Clone, PartialEq)]
pub enum DeletionOutcome {
    Deleted(ObjectKey),
    Failed { key: ObjectKey, error: StorageError },
}

impl DeletionOutcome {
    pub fn key(&self) -> &ObjectKey {
        match self {
            DeletionOutcome::Deleted(key) => key,
            DeletionOutcome::Failed { key, .. } => key,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, DeletionOutcome::Deleted(_))
    }
}
