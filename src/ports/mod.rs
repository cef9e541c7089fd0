pub mod services;
pub mod storage;

// Re-export all port traits for convenience
pub use services::{CleanupError, CleanupService, PolicyLoader, PolicySource};
pub use storage::{BackupStore, ConfigDocumentStore, DeletionOutcome};
