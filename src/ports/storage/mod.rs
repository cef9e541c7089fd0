mod backup_store;

pub use backup_store::{BackupStore, ConfigDocumentStore, DeletionOutcome};
