pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - core entities, the retention engine and errors
pub use domain::{
    BackupObject,
    BucketName,
    CleanupReport,
    // Errors
    ConfigurationError,
    DomainValidationError,
    FolderReport,
    FolderStatus,
    // Value objects
    ObjectKey,
    PolicyConfiguration,
    RetainReason,
    RetentionDecision,
    // Models
    RetentionPolicy,
    StorageError,
    // Engine
    age_in_days,
    decide,
};

// Port types - interfaces for external systems
pub use ports::{
    // Storage ports
    BackupStore,
    // Service ports
    CleanupError,
    CleanupService,
    ConfigDocumentStore,
    DeletionOutcome,
    PolicyLoader,
    PolicySource,
};

// Service implementations - job orchestration and config loading
pub use services::{CleanupOptions, CleanupServiceImpl, PolicyLoaderImpl, parse_policy_document};

// Application factory and configuration
pub use app::{
    AppBuilder, AppConfig, AppDependencies, AppError, AppServices, StorageBackend,
    create_in_memory_app,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::storage::{ApacheObjectStoreAdapter, ObjectStoreConfigAdapter};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        AppBuilder, AppServices, BackupObject, BackupStore, BucketName, CleanupOptions,
        CleanupService, ObjectKey, PolicyConfiguration, PolicySource, RetentionPolicy,
        StorageBackend, decide,
    };
}
