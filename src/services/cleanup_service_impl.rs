use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{StreamExt, stream};
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::{
    domain::{
        models::{
            CleanupReport, FailedDeletion, FolderReport, FolderStatus, PolicyConfiguration,
            RetainReason, RetentionPolicy,
        },
        retention::decide,
        value_objects::ObjectKey,
    },
    ports::{
        services::{CleanupError, CleanupService, PolicyLoader, PolicySource},
        storage::{BackupStore, DeletionOutcome},
    },
};

/// Knobs for a cleanup run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOptions {
    /// Compute and report decisions without deleting anything
    pub dry_run: bool,
    /// Number of folders processed at the same time
    pub folder_concurrency: usize,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            folder_concurrency: 1,
        }
    }
}

/// Implementation of the CleanupService
#[derive(Clone)]
pub struct CleanupServiceImpl {
    store: Arc<dyn BackupStore>,
    loader: Arc<dyn PolicyLoader>,
    options: CleanupOptions,
}

impl CleanupServiceImpl {
    pub fn new(
        store: Arc<dyn BackupStore>,
        loader: Arc<dyn PolicyLoader>,
        options: CleanupOptions,
    ) -> Self {
        Self {
            store,
            loader,
            options,
        }
    }

    pub fn options(&self) -> &CleanupOptions {
        &self.options
    }

    async fn delete_expired(
        &self,
        policy: &RetentionPolicy,
        keys: &[ObjectKey],
    ) -> (usize, Vec<FailedDeletion>) {
        let outcomes = self.store.delete_backups(keys).await;

        let mut deleted = 0;
        let mut failed = Vec::new();

        for outcome in outcomes {
            match outcome {
                DeletionOutcome::Deleted(key) => {
                    info!(key = %key, "Successfully deleted backup");
                    deleted += 1;
                }
                DeletionOutcome::Failed { key, error } => {
                    error!(
                        folder = %policy.folder,
                        key = %key,
                        error = %error,
                        "Failed to delete backup"
                    );
                    failed.push(FailedDeletion {
                        key: key.to_string(),
                        error: error.to_string(),
                    });
                }
            }
        }

        (deleted, failed)
    }
}

fn log_folder_summary(report: &FolderReport) {
    info!(
        folder = %report.folder,
        evaluated = report.total_objects,
        kept = report.kept,
        to_delete = report.objects_to_delete,
        deleted = report.deleted,
        failed = report.failed,
        status = %report.status,
        error = report.error.as_deref().unwrap_or(""),
        "Folder processing complete"
    );
}

#[async_trait]
impl CleanupService for CleanupServiceImpl {
    async fn process_folder(&self, policy: &RetentionPolicy, now: DateTime<Utc>) -> FolderReport {
        let span = info_span!("folder", folder = %policy.folder);

        async move {
            info!(policy = %policy, "Processing folder");

            let objects = match self.store.list_backups(&policy.folder).await {
                Ok(objects) => objects,
                Err(e) => {
                    error!(error = %e, "Error listing folder");
                    let report = FolderReport::listing_failed(&policy.folder, e.to_string());
                    log_folder_summary(&report);
                    return report;
                }
            };

            info!(count = objects.len(), "Found backups in folder");

            let decision = decide(&objects, policy, now);

            for retained in &decision.to_keep {
                match retained.reason {
                    RetainReason::Protected { rank } => debug!(
                        key = %retained.key,
                        rank,
                        min_backups_to_keep = policy.min_backups_to_keep,
                        "Keeping backup (within newest backups)"
                    ),
                    RetainReason::WithinRetention { age_days } => debug!(
                        key = %retained.key,
                        age_days,
                        days_to_keep = policy.days_to_keep,
                        "Keeping backup (within retention period)"
                    ),
                }
            }

            for expired in &decision.to_delete {
                info!(
                    key = %expired.key,
                    age_days = expired.age_days,
                    days_to_keep = policy.days_to_keep,
                    "Marking backup for deletion"
                );
            }

            let (status, deleted, failed_keys) = if self.options.dry_run {
                (FolderStatus::DryRun, 0, Vec::new())
            } else if decision.to_delete.is_empty() {
                (FolderStatus::Completed, 0, Vec::new())
            } else {
                let (deleted, failed_keys) =
                    self.delete_expired(policy, &decision.delete_keys()).await;
                let status = if failed_keys.is_empty() {
                    FolderStatus::Completed
                } else {
                    FolderStatus::PartialFailure
                };
                (status, deleted, failed_keys)
            };

            let report = FolderReport {
                folder: policy.folder.clone(),
                status,
                total_objects: objects.len(),
                kept: decision.to_keep.len(),
                objects_to_delete: decision.to_delete.len(),
                deleted,
                failed: failed_keys.len(),
                failed_keys,
                error: None,
            };

            log_folder_summary(&report);
            report
        }
        .instrument(span)
        .await
    }

    async fn run(&self, policies: &PolicyConfiguration, now: DateTime<Utc>) -> CleanupReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        info!(
            run_id = %run_id,
            policies = policies.len(),
            dry_run = self.options.dry_run,
            "Backup cleanup started"
        );

        if policies.is_empty() {
            warn!("No retention policies found in configuration");
        }

        let folders: Vec<_> = policies
            .iter()
            .map(|policy| self.process_folder(policy, now))
            .collect();

        // `buffered` keeps results in configuration order
        let results: Vec<FolderReport> = stream::iter(folders)
            .buffered(self.options.folder_concurrency.max(1))
            .collect()
            .await;

        let report = CleanupReport::from_results(
            run_id,
            started_at,
            Utc::now(),
            self.options.dry_run,
            results,
        );

        if report.has_failures() {
            warn!(
                run_id = %run_id,
                total_deleted = report.total_deleted,
                total_failed = report.total_failed,
                folders_failed = report.folders_failed,
                "Backup cleanup finished with errors"
            );
        } else {
            info!(
                run_id = %run_id,
                total_deleted = report.total_deleted,
                total_failed = report.total_failed,
                "Backup cleanup complete"
            );
        }

        report
    }

    async fn run_from_source(
        &self,
        source: &PolicySource,
        now: DateTime<Utc>,
    ) -> Result<CleanupReport, CleanupError> {
        let policies = self.loader.load(source).await?;
        Ok(self.run(&policies, now).await)
    }
}
