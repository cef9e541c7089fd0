use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use backup_retention::{
    BackupObject, BackupStore, BucketName, CleanupError, CleanupOptions, CleanupService,
    CleanupServiceImpl, ConfigDocumentStore, ConfigurationError, DeletionOutcome, FolderStatus,
    ObjectKey, PolicyConfiguration, PolicyLoaderImpl, PolicySource, RetentionPolicy, StorageError,
    domain::errors::StorageResult,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 2, 0, 0).unwrap()
}

/// In-process store with controllable timestamps and failures
#[derive(Default)]
struct FakeBackupStore {
    objects: Mutex<Vec<BackupObject>>,
    failing_prefixes: HashSet<String>,
    failing_deletes: HashSet<String>,
    list_delays_ms: HashMap<String, u64>,
    delete_calls: Mutex<Vec<String>>,
    listings_in_flight: AtomicUsize,
    max_listings_in_flight: AtomicUsize,
}

impl FakeBackupStore {
    fn with_backups(folder: &str, ages_in_days: &[i64]) -> Self {
        let store = Self::default();
        store.add_backups(folder, ages_in_days);
        store
    }

    fn add_backups(&self, folder: &str, ages_in_days: &[i64]) {
        let mut objects = self.objects.lock().unwrap();
        for age in ages_in_days {
            objects.push(BackupObject::new(
                ObjectKey::new(format!("{}backup-{:03}.tar.gz", folder, age)).unwrap(),
                now() - Duration::days(*age),
                2048,
            ));
        }
    }

    fn remaining(&self, folder: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.key.has_prefix(folder))
            .map(|o| o.key.to_string())
            .collect();
        keys.sort();
        keys
    }

    fn delete_calls(&self) -> Vec<String> {
        self.delete_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BackupStore for FakeBackupStore {
    async fn list_backups(&self, prefix: &str) -> StorageResult<Vec<BackupObject>> {
        let in_flight = self.listings_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_listings_in_flight
            .fetch_max(in_flight, Ordering::SeqCst);

        if let Some(delay) = self.list_delays_ms.get(prefix) {
            tokio::time::sleep(std::time::Duration::from_millis(*delay)).await;
        }
        self.listings_in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_prefixes.contains(prefix) {
            return Err(StorageError::AccessDenied {
                location: prefix.to_string(),
                operation: "list".to_string(),
            });
        }

        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.key.has_prefix(prefix))
            .cloned()
            .collect())
    }

    async fn delete_backups(&self, keys: &[ObjectKey]) -> Vec<DeletionOutcome> {
        let mut outcomes = Vec::with_capacity(keys.len());

        for key in keys {
            self.delete_calls.lock().unwrap().push(key.to_string());

            if self.failing_deletes.contains(key.as_str()) {
                outcomes.push(DeletionOutcome::Failed {
                    key: key.clone(),
                    error: StorageError::AccessDenied {
                        location: key.to_string(),
                        operation: "delete".to_string(),
                    },
                });
                continue;
            }

            self.objects.lock().unwrap().retain(|o| &o.key != key);
            outcomes.push(DeletionOutcome::Deleted(key.clone()));
        }

        outcomes
    }
}

/// Config store that holds no documents
struct NoDocuments;

#[async_trait]
impl ConfigDocumentStore for NoDocuments {
    async fn fetch_document(&self, _bucket: &BucketName, key: &ObjectKey) -> StorageResult<Bytes> {
        Err(StorageError::ObjectNotFound {
            key: key.to_string(),
        })
    }
}

fn service(store: Arc<FakeBackupStore>, options: CleanupOptions) -> CleanupServiceImpl {
    let loader = PolicyLoaderImpl::new(Arc::new(NoDocuments));
    CleanupServiceImpl::new(store, Arc::new(loader), options)
}

fn policies(policies: Vec<RetentionPolicy>) -> PolicyConfiguration {
    PolicyConfiguration::new(policies).unwrap()
}

#[tokio::test]
async fn deletes_expired_backups_beyond_the_floor() {
    let store = Arc::new(FakeBackupStore::with_backups(
        "db/",
        &[44, 43, 42, 41, 40, 39, 38, 37, 36, 35],
    ));
    let service = service(store.clone(), CleanupOptions::default());

    let report = service
        .process_folder(&RetentionPolicy::new("db/", 30, 5), now())
        .await;

    assert_eq!(report.status, FolderStatus::Completed);
    assert_eq!(report.total_objects, 10);
    assert_eq!(report.kept, 5);
    assert_eq!(report.objects_to_delete, 5);
    assert_eq!(report.deleted, 5);
    assert_eq!(report.failed, 0);
    assert_eq!(
        store.remaining("db/"),
        vec![
            "db/backup-035.tar.gz",
            "db/backup-036.tar.gz",
            "db/backup-037.tar.gz",
            "db/backup-038.tar.gz",
            "db/backup-039.tar.gz",
        ]
    );
}

#[tokio::test]
async fn nothing_deleted_when_all_backups_are_recent() {
    let store = Arc::new(FakeBackupStore::with_backups("db/", &[1, 2, 3, 4, 5]));
    let service = service(store.clone(), CleanupOptions::default());

    let report = service
        .process_folder(&RetentionPolicy::new("db/", 30, 2), now())
        .await;

    assert_eq!(report.status, FolderStatus::Completed);
    assert_eq!(report.kept, 5);
    assert_eq!(report.objects_to_delete, 0);
    assert!(store.delete_calls().is_empty());
}

#[tokio::test]
async fn empty_folder_completes_without_deleting() {
    let store = Arc::new(FakeBackupStore::default());
    let service = service(store.clone(), CleanupOptions::default());

    let report = service
        .process_folder(&RetentionPolicy::new("empty/", 30, 3), now())
        .await;

    assert_eq!(report.status, FolderStatus::Completed);
    assert_eq!(report.total_objects, 0);
    assert!(store.delete_calls().is_empty());
}

#[tokio::test]
async fn failed_deletion_does_not_stop_the_others() {
    let mut store = FakeBackupStore::with_backups("db/", &[1, 50, 60, 70]);
    store
        .failing_deletes
        .insert("db/backup-060.tar.gz".to_string());
    let store = Arc::new(store);
    let service = service(store.clone(), CleanupOptions::default());

    let report = service
        .process_folder(&RetentionPolicy::new("db/", 30, 1), now())
        .await;

    assert_eq!(report.status, FolderStatus::PartialFailure);
    assert_eq!(report.objects_to_delete, 3);
    assert_eq!(report.deleted, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.failed_keys.len(), 1);
    assert_eq!(report.failed_keys[0].key, "db/backup-060.tar.gz");
    assert!(report.failed_keys[0].error.contains("Access denied"));

    assert_eq!(store.delete_calls().len(), 3);
    assert_eq!(
        store.remaining("db/"),
        vec!["db/backup-001.tar.gz", "db/backup-060.tar.gz"]
    );
}

#[tokio::test]
async fn listing_failure_is_isolated_to_its_folder() {
    let mut store = FakeBackupStore::with_backups("logs/", &[10, 100]);
    store.add_backups("db/", &[5, 90]);
    store.failing_prefixes.insert("db/".to_string());
    let store = Arc::new(store);
    let service = service(store.clone(), CleanupOptions::default());

    let report = service
        .run(
            &policies(vec![
                RetentionPolicy::new("db/", 30, 1),
                RetentionPolicy::new("logs/", 30, 1),
            ]),
            now(),
        )
        .await;

    assert_eq!(report.results.len(), 2);

    let db = &report.results[0];
    assert_eq!(db.folder, "db/");
    assert_eq!(db.status, FolderStatus::ListingFailed);
    assert!(db.error.as_deref().unwrap().contains("Access denied"));
    assert_eq!(db.deleted, 0);

    let logs = &report.results[1];
    assert_eq!(logs.status, FolderStatus::Completed);
    assert_eq!(logs.deleted, 1);

    assert_eq!(report.folders_failed, 1);
    assert_eq!(report.total_deleted, 1);
    assert!(report.has_failures());
    assert_eq!(store.remaining("db/").len(), 2);
    assert_eq!(store.remaining("logs/"), vec!["logs/backup-010.tar.gz"]);
}

#[tokio::test]
async fn dry_run_reports_without_deleting() {
    let store = Arc::new(FakeBackupStore::with_backups("db/", &[1, 40, 50]));
    let service = service(
        store.clone(),
        CleanupOptions {
            dry_run: true,
            folder_concurrency: 1,
        },
    );

    let report = service
        .run(&policies(vec![RetentionPolicy::new("db/", 30, 1)]), now())
        .await;

    assert!(report.dry_run);
    assert_eq!(report.message, "Backup cleanup dry run completed");

    let folder = &report.results[0];
    assert_eq!(folder.status, FolderStatus::DryRun);
    assert_eq!(folder.objects_to_delete, 2);
    assert_eq!(folder.deleted, 0);
    assert_eq!(report.total_deleted, 0);
    assert!(!report.has_failures());

    assert!(store.delete_calls().is_empty());
    assert_eq!(store.remaining("db/").len(), 3);
}

#[tokio::test]
async fn concurrent_folders_report_in_configuration_order() {
    let mut store = FakeBackupStore::default();
    store.add_backups("a/", &[100]);
    store.add_backups("b/", &[100]);
    store.add_backups("c/", &[100]);
    // The first folder finishes last
    store.list_delays_ms.insert("a/".to_string(), 50);
    store.list_delays_ms.insert("b/".to_string(), 20);
    let store = Arc::new(store);

    let service = service(
        store.clone(),
        CleanupOptions {
            dry_run: false,
            folder_concurrency: 3,
        },
    );

    let report = service
        .run(
            &policies(vec![
                RetentionPolicy::new("a/", 30, 0),
                RetentionPolicy::new("b/", 30, 0),
                RetentionPolicy::new("c/", 30, 0),
            ]),
            now(),
        )
        .await;

    let folders: Vec<&str> = report.results.iter().map(|r| r.folder.as_str()).collect();
    assert_eq!(folders, vec!["a/", "b/", "c/"]);
    assert_eq!(report.total_deleted, 3);
}

#[tokio::test]
async fn run_with_no_policies() {
    let store = Arc::new(FakeBackupStore::with_backups("db/", &[400]));
    let service = service(store.clone(), CleanupOptions::default());

    let report = service.run(&policies(vec![]), now()).await;

    assert!(report.results.is_empty());
    assert_eq!(report.message, "No retention policies configured");
    assert!(store.delete_calls().is_empty());
}

#[tokio::test]
async fn run_from_inline_source() {
    let store = Arc::new(FakeBackupStore::with_backups("db/", &[1, 2, 40, 41]));
    let service = service(store.clone(), CleanupOptions::default());

    let source = PolicySource::parse(
        r#"{"retention_policies": [{"folder": "db/", "days_to_keep": 7, "min_backups_to_keep": 1}]}"#,
    )
    .unwrap();

    let report = service.run_from_source(&source, now()).await.unwrap();

    assert_eq!(report.message, "Backup cleanup completed");
    assert_eq!(report.total_deleted, 2);
    assert_eq!(
        store.remaining("db/"),
        vec!["db/backup-001.tar.gz", "db/backup-002.tar.gz"]
    );
}

#[tokio::test]
async fn configuration_error_aborts_before_touching_storage() {
    let store = Arc::new(FakeBackupStore::with_backups("db/", &[400]));
    let service = service(store.clone(), CleanupOptions::default());

    let source = PolicySource::parse(r#"{"retention_policies": [{"days_to_keep": 7}]}"#).unwrap();
    let result = service.run_from_source(&source, now()).await;
    assert!(matches!(
        result,
        Err(CleanupError::Configuration(
            ConfigurationError::MalformedDocument { .. }
        ))
    ));

    let source = PolicySource::parse("s3://corp-config/retention.json").unwrap();
    let result = service.run_from_source(&source, now()).await;
    assert!(matches!(
        result,
        Err(CleanupError::Configuration(ConfigurationError::FetchFailed { .. }))
    ));

    assert!(store.delete_calls().is_empty());
    assert_eq!(store.remaining("db/").len(), 1);
}

#[tokio::test]
async fn report_serializes_for_the_caller() {
    let mut store = FakeBackupStore::with_backups("db/", &[1, 50]);
    store
        .failing_deletes
        .insert("db/backup-050.tar.gz".to_string());
    let service = service(Arc::new(store), CleanupOptions::default());

    let report = service
        .run(&policies(vec![RetentionPolicy::new("db/", 30, 1)]), now())
        .await;
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["message"], "Backup cleanup completed");
    assert_eq!(json["total_failed"], 1);
    assert_eq!(json["results"][0]["status"], "partial_failure");
    assert_eq!(
        json["results"][0]["failed_keys"][0]["key"],
        "db/backup-050.tar.gz"
    );
    assert!(json["results"][0].get("error").is_none());
}

#[tokio::test]
async fn folder_concurrency_is_bounded() {
    let mut store = FakeBackupStore::default();
    let folders = ["a/", "b/", "c/", "d/", "e/"];
    for folder in folders {
        store.add_backups(folder, &[100]);
        store.list_delays_ms.insert(folder.to_string(), 20);
    }
    let store = Arc::new(store);

    let service = service(
        store.clone(),
        CleanupOptions {
            dry_run: false,
            folder_concurrency: 2,
        },
    );

    let report = service
        .run(
            &policies(
                folders
                    .iter()
                    .map(|folder| RetentionPolicy::new(*folder, 30, 0))
                    .collect(),
            ),
            now(),
        )
        .await;

    assert_eq!(report.results.len(), 5);
    assert_eq!(report.total_deleted, 5);
    assert_eq!(store.max_listings_in_flight.load(Ordering::SeqCst), 2);
}
