pub mod backup;
pub mod decision;
pub mod policy;
pub mod report;

pub use backup::BackupObject;
pub use decision::{ExpiredBackup, RetainReason, RetainedBackup, RetentionDecision};
pub use policy::{
    DEFAULT_DAYS_TO_KEEP, DEFAULT_MIN_BACKUPS_TO_KEEP, PolicyConfiguration, RetentionPolicy,
};
pub use report::{CleanupReport, FailedDeletion, FolderReport, FolderStatus};
