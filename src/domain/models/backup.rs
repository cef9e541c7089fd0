use chrono::{DateTime, Utc};

use crate::domain::value_objects::ObjectKey;

/// A backup object as reported by the store's listing
///
/// Timestamps are normalized to UTC at the storage boundary, so everything
/// downstream compares instants rather than wall-clock readings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupObject {
    pub key: ObjectKey,
    pub last_modified: DateTime<Utc>,
    pub size: u64,
    pub etag: Option<String>,
}

impl BackupObject {
    pub fn new(key: ObjectKey, last_modified: DateTime<Utc>, size: u64) -> Self {
        Self {
            key,
            last_modified,
            size,
            etag: None,
        }
    }
}
