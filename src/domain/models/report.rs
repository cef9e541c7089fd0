use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// How processing of a single folder ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderStatus {
    Completed,
    PartialFailure,
    ListingFailed,
    DryRun,
}

impl FolderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FolderStatus::Completed => "completed",
            FolderStatus::PartialFailure => "partial_failure",
            FolderStatus::ListingFailed => "listing_failed",
            FolderStatus::DryRun => "dry_run",
        }
    }
}

impl std::fmt::Display for FolderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDeletion {
    pub key: String,
    pub error: String,
}

/// Per-folder section of the run summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderReport {
    pub folder: String,
    pub status: FolderStatus,
    pub total_objects: usize,
    pub kept: usize,
    pub objects_to_delete: usize,
    pub deleted: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_keys: Vec<FailedDeletion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FolderReport {
    pub fn listing_failed(folder: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            status: FolderStatus::ListingFailed,
            total_objects: 0,
            kept: 0,
            objects_to_delete: 0,
            deleted: 0,
            failed: 0,
            failed_keys: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Structured summary returned by a cleanup run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    pub message: String,
    pub total_deleted: usize,
    pub total_failed: usize,
    pub folders_failed: usize,
    pub results: Vec<FolderReport>,
}

impl CleanupReport {
    /// Aggregate folder reports into a run summary
    pub fn from_results(
        run_id: Uuid,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        dry_run: bool,
        results: Vec<FolderReport>,
    ) -> Self {
        let total_deleted = results.iter().map(|r| r.deleted).sum();
        let total_failed = results.iter().map(|r| r.failed).sum();
        let folders_failed = results
            .iter()
            .filter(|r| r.status == FolderStatus::ListingFailed)
            .count();

        let message = if results.is_empty() {
            "No retention policies configured"
        } else if dry_run {
            "Backup cleanup dry run completed"
        } else {
            "Backup cleanup completed"
        };

        Self {
            run_id,
            started_at,
            finished_at,
            dry_run,
            message: message.to_string(),
            total_deleted,
            total_failed,
            folders_failed,
            results,
        }
    }

    /// True when any folder listing or object deletion failed
    pub fn has_failures(&self) -> bool {
        self.total_failed > 0 || self.folders_failed > 0
    }
}
