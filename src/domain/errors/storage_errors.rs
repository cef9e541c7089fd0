use crate::domain::value_objects::ObjectKey;

/// Errors that can occur while listing, reading or deleting objects
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// Object not found
    ObjectNotFound { key: String },

    /// Access denied by the backend
    AccessDenied { location: String, operation: String },

    /// Listing a prefix failed
    ListingFailed { prefix: String, message: String },

    /// Deleting a single object failed
    DeleteFailed { key: ObjectKey, message: String },

    /// The store returned a key or payload we cannot represent
    ValidationError { message: String },

    /// Infrastructure error with external source
    InfrastructureError {
        message: String,
        source: Option<String>, // Store error as string to allow Clone
    },
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::ObjectNotFound { key } => {
                write!(f, "Object not found: {}", key)
            }
            StorageError::AccessDenied {
                location,
                operation,
            } => {
                write!(
                    f,
                    "Access denied for operation '{}' on: {}",
                    operation, location
                )
            }
            StorageError::ListingFailed { prefix, message } => {
                write!(f, "Failed to list objects under '{}': {}", prefix, message)
            }
            StorageError::DeleteFailed { key, message } => {
                write!(f, "Failed to delete object '{}': {}", key, message)
            }
            StorageError::ValidationError { message } => {
                write!(f, "Validation error: {}", message)
            }
            StorageError::InfrastructureError { message, .. } => {
                write!(f, "Infrastructure error: {}", message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
