// Infrastructure error types
pub mod error;

// Storage implementations
pub mod apache_object_store_adapter;

// Provider-specific construction
pub mod s3;

// Re-export key types
pub use apache_object_store_adapter::{
    ApacheObjectStoreAdapter, DEFAULT_DELETE_CONCURRENCY, MAX_DELETE_BATCH, ObjectStoreConfigAdapter,
    StoreFactory,
};
pub use error::StoreError;
pub use s3::{S3Config, create_s3_store};
