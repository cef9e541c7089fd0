use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, stream};
use object_store::{ObjectStore as ApacheObjectStore, path::Path as ObjectPath};
use std::{
    collections::{BTreeSet, HashSet},
    sync::Arc,
};
use tracing::{debug, warn};

use super::error::{delete_error, listing_error};
use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::BackupObject,
        value_objects::{BucketName, ObjectKey},
    },
    ports::storage::{BackupStore, ConfigDocumentStore, DeletionOutcome},
};

/// Keys per bulk delete request (the S3 `DeleteObjects` limit)
pub const MAX_DELETE_BATCH: usize = 1_000;

/// Number of delete batches in flight at once when none is configured
pub const DEFAULT_DELETE_CONCURRENCY: usize = 10;

/// Adapter that implements our BackupStore trait using Apache object_store
pub struct ApacheObjectStoreAdapter {
    inner: Arc<dyn ApacheObjectStore>,
    delete_concurrency: usize,
}

impl ApacheObjectStoreAdapter {
    pub fn new(store: Arc<dyn ApacheObjectStore>) -> Self {
        Self {
            inner: store,
            delete_concurrency: DEFAULT_DELETE_CONCURRENCY,
        }
    }

    pub fn with_delete_concurrency(mut self, concurrency: usize) -> Self {
        self.delete_concurrency = concurrency.max(1);
        self
    }

    /// Send one batch through the store's bulk delete
    async fn delete_batch(&self, batch: Vec<PendingDelete>) -> Vec<(usize, DeletionOutcome)> {
        let locations: Vec<object_store::Result<ObjectPath>> =
            batch.iter().map(|pending| Ok(pending.path.clone())).collect();

        let results: Vec<object_store::Result<ObjectPath>> = self
            .inner
            .delete_stream(stream::iter(locations).boxed())
            .collect()
            .await;

        debug!(keys = batch.len(), "Delete batch finished");
        batch_outcomes(batch, results)
    }
}

/// A key queued for deletion, with its position in the caller's request
struct PendingDelete {
    index: usize,
    key: ObjectKey,
    path: ObjectPath,
}

/// Pair each key of a batch with its result.
///
/// A complete response carries one result per key, in request order. Anything
/// else means the request as a whole failed: keys the store confirmed are
/// deleted, every other key of the batch is failed.
fn batch_outcomes(
    batch: Vec<PendingDelete>,
    results: Vec<object_store::Result<ObjectPath>>,
) -> Vec<(usize, DeletionOutcome)> {
    if results.len() == batch.len() {
        return batch
            .into_iter()
            .zip(results)
            .map(|(pending, result)| {
                let outcome = match result {
                    Ok(_) => DeletionOutcome::Deleted(pending.key),
                    // Already gone: S3 treats this as a successful delete too
                    Err(object_store::Error::NotFound { .. }) => {
                        DeletionOutcome::Deleted(pending.key)
                    }
                    Err(e) => DeletionOutcome::Failed {
                        error: delete_error(&pending.key, e),
                        key: pending.key,
                    },
                };
                (pending.index, outcome)
            })
            .collect();
    }

    let confirmed: HashSet<String> = results
        .iter()
        .filter_map(|result| result.as_ref().ok())
        .map(ToString::to_string)
        .collect();
    let cause = results
        .into_iter()
        .find_map(Result::err)
        .map(|e| e.to_string())
        .unwrap_or_else(|| "bulk delete returned an incomplete response".to_string());

    warn!(keys = batch.len(), error = %cause, "Delete batch failed");

    batch
        .into_iter()
        .map(|pending| {
            let location: &str = pending.path.as_ref();
            let outcome = if confirmed.contains(location) {
                DeletionOutcome::Deleted(pending.key)
            } else {
                DeletionOutcome::Failed {
                    error: StorageError::DeleteFailed {
                        key: pending.key.clone(),
                        message: cause.clone(),
                    },
                    key: pending.key,
                }
            };
            (pending.index, outcome)
        })
        .collect()
}

/// Deepest "directory" fully contained in `prefix`.
///
/// object_store lists by path segment while S3 prefixes are raw strings, so
/// we list from the parent directory and filter by the raw prefix afterwards.
fn list_root(prefix: &str) -> Option<ObjectPath> {
    prefix
        .rfind('/')
        .map(|idx| &prefix[..idx])
        .filter(|dir| !dir.is_empty())
        .map(ObjectPath::from)
}

/// Console-created "folder" objects (`db/daily/`) come back from object_store
/// with the trailing `/` stripped. They are recognised as empty objects with
/// other listed keys nested under them.
fn is_directory_marker(location: &str, size: u64, listed: &BTreeSet<&str>) -> bool {
    if size != 0 {
        return false;
    }

    let nested = format!("{}/", location);
    listed
        .range(nested.as_str()..)
        .next()
        .is_some_and(|next| next.starts_with(nested.as_str()))
}

#[async_trait]
impl BackupStore for ApacheObjectStoreAdapter {
    async fn list_backups(&self, prefix: &str) -> StorageResult<Vec<BackupObject>> {
        let root = list_root(prefix);
        let mut stream = self.inner.list(root.as_ref());
        let mut listed = Vec::new();

        while let Some(result) = stream.next().await {
            let meta = result.map_err(|e| listing_error(prefix, e))?;

            let location: &str = meta.location.as_ref();
            if location.starts_with(prefix) {
                listed.push(meta);
            }
        }

        let locations: BTreeSet<&str> = listed
            .iter()
            .map(|meta| AsRef::<str>::as_ref(&meta.location))
            .collect();
        let mut objects = Vec::with_capacity(listed.len());

        for meta in &listed {
            let location: &str = meta.location.as_ref();

            if is_directory_marker(location, meta.size, &locations) {
                debug!(location, "Skipping directory marker");
                continue;
            }

            let key = ObjectKey::new(location).map_err(|e| StorageError::ValidationError {
                message: format!("Invalid object key from store: {}", e),
            })?;

            objects.push(BackupObject {
                key,
                last_modified: meta.last_modified,
                size: meta.size,
                etag: meta.e_tag.clone(),
            });
        }

        debug!(prefix, count = objects.len(), "Listed backups");
        Ok(objects)
    }

    async fn delete_backups(&self, keys: &[ObjectKey]) -> Vec<DeletionOutcome> {
        let mut outcomes = Vec::with_capacity(keys.len());
        let mut pending = Vec::with_capacity(keys.len());

        for (index, key) in keys.iter().enumerate() {
            match ObjectPath::parse(key.as_str()) {
                Ok(path) => pending.push(PendingDelete {
                    index,
                    key: key.clone(),
                    path,
                }),
                Err(e) => outcomes.push((
                    index,
                    DeletionOutcome::Failed {
                        error: StorageError::ValidationError {
                            message: format!("Key is not a valid store path: {}", e),
                        },
                        key: key.clone(),
                    },
                )),
            }
        }

        let mut batches = Vec::new();
        let mut pending = pending.into_iter().peekable();
        while pending.peek().is_some() {
            batches.push(pending.by_ref().take(MAX_DELETE_BATCH).collect::<Vec<_>>());
        }

        let requests: Vec<_> = batches
            .into_iter()
            .map(|batch| self.delete_batch(batch))
            .collect();

        let deleted: Vec<Vec<(usize, DeletionOutcome)>> = stream::iter(requests)
            .buffered(self.delete_concurrency)
            .collect()
            .await;

        outcomes.extend(deleted.into_iter().flatten());
        outcomes.sort_by_key(|(index, _)| *index);
        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }
}

/// Function producing a store handle for an arbitrary bucket
pub type StoreFactory =
    Arc<dyn Fn(&BucketName) -> StorageResult<Arc<dyn ApacheObjectStore>> + Send + Sync>;

/// Reads the policy document from whichever bucket the source names
pub struct ObjectStoreConfigAdapter {
    connect: StoreFactory,
}

impl ObjectStoreConfigAdapter {
    pub fn new(connect: StoreFactory) -> Self {
        Self { connect }
    }
}

#[async_trait]
impl ConfigDocumentStore for ObjectStoreConfigAdapter {
    async fn fetch_document(&self, bucket: &BucketName, key: &ObjectKey) -> StorageResult<Bytes> {
        let store = (self.connect)(bucket)?;
        let path = ObjectPath::parse(key.as_str()).map_err(|e| StorageError::ValidationError {
            message: format!("Invalid config key: {}", e),
        })?;

        let result = store.get(&path).await?;

        Ok(result.bytes().await?)
    }
}
