use crate::domain::{errors::StorageError, value_objects::ObjectKey};
use thiserror::Error as ThisError;

/// Errors raised while constructing a store backend
#[derive(ThisError, Debug)]
pub enum StoreError {
    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),
}

/// Convert object_store errors to domain storage errors
impl From<object_store::Error> for StorageError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => StorageError::ObjectNotFound { key: path },
            object_store::Error::PermissionDenied { path, .. }
            | object_store::Error::Unauthenticated { path, .. } => StorageError::AccessDenied {
                location: path,
                operation: "unknown".to_string(),
            },
            object_store::Error::InvalidPath { .. } => StorageError::ValidationError {
                message: err.to_string(),
            },
            _ => StorageError::InfrastructureError {
                message: format!("Object store operation failed: {}", err),
                source: Some(err.to_string()),
            },
        }
    }
}

/// Map a failed listing of `prefix` to a domain error
pub(crate) fn listing_error(prefix: &str, err: object_store::Error) -> StorageError {
    match StorageError::from(err) {
        StorageError::AccessDenied { .. } => StorageError::AccessDenied {
            location: prefix.to_string(),
            operation: "list".to_string(),
        },
        other => StorageError::ListingFailed {
            prefix: prefix.to_string(),
            message: other.to_string(),
        },
    }
}

/// Map a failed deletion of `key` to a domain error
pub(crate) fn delete_error(key: &ObjectKey, err: object_store::Error) -> StorageError {
    match StorageError::from(err) {
        StorageError::AccessDenied { .. } => StorageError::AccessDenied {
            location: key.to_string(),
            operation: "delete".to_string(),
        },
        other => StorageError::DeleteFailed {
            key: key.clone(),
            message: other.to_string(),
        },
    }
}
