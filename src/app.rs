use object_store::{ObjectStore as ApacheObjectStore, memory::InMemory};
use std::sync::Arc;

use crate::{
    adapters::outbound::storage::{
        ApacheObjectStoreAdapter, DEFAULT_DELETE_CONCURRENCY, ObjectStoreConfigAdapter, S3Config,
        StoreFactory, create_s3_store,
    },
    domain::{
        errors::{StorageError, StorageResult},
        value_objects::BucketName,
    },
    ports::storage::{BackupStore, ConfigDocumentStore},
    services::{CleanupOptions, CleanupServiceImpl, PolicyLoaderImpl},
};

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bucket holding the backup folders
    pub bucket: BucketName,
    pub storage_backend: StorageBackend,
    pub cleanup: CleanupOptions,
    pub delete_concurrency: usize,
}

impl AppConfig {
    pub fn new(bucket: BucketName) -> Self {
        Self {
            bucket,
            storage_backend: StorageBackend::InMemory,
            cleanup: CleanupOptions::default(),
            delete_concurrency: DEFAULT_DELETE_CONCURRENCY,
        }
    }
}

/// Storage backend configuration
#[derive(Debug, Clone)]
pub enum StorageBackend {
    InMemory,
    S3 {
        region: Option<String>,
        access_key: Option<String>,
        secret_key: Option<String>,
        endpoint: Option<String>,
    },
    MinIO {
        endpoint: String,
        access_key: String,
        secret_key: String,
        use_ssl: bool,
    },
}

impl StorageBackend {
    fn s3_config(&self, bucket: &BucketName) -> Option<S3Config> {
        match self {
            StorageBackend::InMemory => None,
            StorageBackend::S3 {
                region,
                access_key,
                secret_key,
                endpoint,
            } => Some(S3Config {
                bucket: bucket.to_string(),
                region: region.clone(),
                access_key: access_key.clone(),
                secret_key: secret_key.clone(),
                allow_http: endpoint
                    .as_deref()
                    .is_some_and(|e| e.starts_with("http://")),
                endpoint: endpoint.clone(),
            }),
            StorageBackend::MinIO {
                endpoint,
                access_key,
                secret_key,
                use_ssl,
            } => Some(S3Config {
                bucket: bucket.to_string(),
                // MinIO ignores the region but the signer needs one
                region: Some("us-east-1".to_string()),
                access_key: Some(access_key.clone()),
                secret_key: Some(secret_key.clone()),
                endpoint: Some(endpoint.clone()),
                allow_http: !use_ssl,
            }),
        }
    }
}

/// Application dependencies container
pub struct AppDependencies {
    pub backup_store: Arc<dyn BackupStore>,
    pub config_store: Arc<dyn ConfigDocumentStore>,
}

/// Application services container
pub struct AppServices {
    pub cleanup_service: CleanupServiceImpl,
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
    object_store: Option<Arc<dyn ApacheObjectStore>>,
}

impl AppBuilder {
    /// Create a new application builder for the given backup bucket
    pub fn new(bucket: BucketName) -> Self {
        Self {
            config: AppConfig::new(bucket),
            object_store: None,
        }
    }

    /// Configure the application with custom settings
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure storage backend
    pub fn with_storage_backend(mut self, backend: StorageBackend) -> Self {
        self.config.storage_backend = backend;
        self
    }

    /// Configure dry-run and folder concurrency
    pub fn with_cleanup_options(mut self, options: CleanupOptions) -> Self {
        self.config.cleanup = options;
        self
    }

    /// Configure how many bulk delete requests may be in flight per folder
    pub fn with_delete_concurrency(mut self, concurrency: usize) -> Self {
        self.config.delete_concurrency = concurrency;
        self
    }

    /// Use an already constructed store for every bucket, bypassing the
    /// configured backend. Meant for tests and local runs.
    pub fn with_object_store(mut self, store: Arc<dyn ApacheObjectStore>) -> Self {
        self.object_store = Some(store);
        self
    }

    /// Build the application dependencies
    pub fn build_dependencies(&self) -> Result<AppDependencies, AppError> {
        if self.config.delete_concurrency == 0 {
            return Err(AppError::Configuration {
                message: "delete concurrency must be at least 1".to_string(),
            });
        }

        let connect = self.store_factory();

        let backup_store = connect(&self.config.bucket).map_err(|e| AppError::StorageInit {
            message: e.to_string(),
        })?;

        let backup_store = Arc::new(
            ApacheObjectStoreAdapter::new(backup_store)
                .with_delete_concurrency(self.config.delete_concurrency),
        ) as Arc<dyn BackupStore>;
        let config_store = Arc::new(ObjectStoreConfigAdapter::new(connect))
            as Arc<dyn ConfigDocumentStore>;

        Ok(AppDependencies {
            backup_store,
            config_store,
        })
    }

    /// Build the complete application with services
    pub fn build(self) -> Result<AppServices, AppError> {
        if self.config.cleanup.folder_concurrency == 0 {
            return Err(AppError::Configuration {
                message: "folder concurrency must be at least 1".to_string(),
            });
        }

        let deps = self.build_dependencies()?;

        let policy_loader = PolicyLoaderImpl::new(deps.config_store);
        let cleanup_service = CleanupServiceImpl::new(
            deps.backup_store,
            Arc::new(policy_loader),
            self.config.cleanup.clone(),
        );

        Ok(AppServices { cleanup_service })
    }

    /// Per-bucket store constructor for the configured backend
    fn store_factory(&self) -> StoreFactory {
        if let Some(store) = &self.object_store {
            let store = store.clone();
            return Arc::new(
                move |_: &BucketName| -> StorageResult<Arc<dyn ApacheObjectStore>> {
                    Ok(store.clone())
                },
            );
        }

        let backend = self.config.storage_backend.clone();
        match backend {
            StorageBackend::InMemory => {
                let store: Arc<dyn ApacheObjectStore> = Arc::new(InMemory::new());
                Arc::new(
                    move |_: &BucketName| -> StorageResult<Arc<dyn ApacheObjectStore>> {
                        Ok(store.clone())
                    },
                )
            }
            backend => Arc::new(
                move |bucket: &BucketName| -> StorageResult<Arc<dyn ApacheObjectStore>> {
                    let Some(config) = backend.s3_config(bucket) else {
                        return Err(StorageError::InfrastructureError {
                            message: "backend has no S3 settings".to_string(),
                            source: None,
                        });
                    };

                    create_s3_store(&config).map_err(|e| StorageError::InfrastructureError {
                        message: format!("Failed to build S3 store for bucket {}", bucket),
                        source: Some(e.to_string()),
                    })
                },
            ),
        }
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage initialization error: {message}")]
    StorageInit { message: String },
}

/// Create an application over an in-memory store, for tests and local runs
pub fn create_in_memory_app(
    bucket: BucketName,
    store: Arc<InMemory>,
    options: CleanupOptions,
) -> Result<AppServices, AppError> {
    AppBuilder::new(bucket)
        .with_object_store(store)
        .with_cleanup_options(options)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket() -> BucketName {
        BucketName::new("backups").unwrap()
    }

    #[test]
    fn test_create_in_memory_app() {
        let app = create_in_memory_app(bucket(), Arc::new(InMemory::new()), CleanupOptions::default())
            .unwrap();

        assert!(!app.cleanup_service.options().dry_run);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let result = AppBuilder::new(bucket())
            .with_cleanup_options(CleanupOptions {
                dry_run: false,
                folder_concurrency: 0,
            })
            .build();
        assert!(matches!(result, Err(AppError::Configuration { .. })));

        let result = AppBuilder::new(bucket()).with_delete_concurrency(0).build();
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }

    #[test]
    fn test_minio_backend_uses_plain_http_without_ssl() {
        let backend = StorageBackend::MinIO {
            endpoint: "http://minio:9000".to_string(),
            access_key: "minio".to_string(),
            secret_key: "minio123".to_string(),
            use_ssl: false,
        };

        let config = backend.s3_config(&bucket()).unwrap();
        assert!(config.allow_http);
        assert_eq!(config.bucket, "backups");
        assert_eq!(config.endpoint.as_deref(), Some("http://minio:9000"));
    }

    #[test]
    fn test_s3_backend_builds_dependencies() {
        let deps = AppBuilder::new(bucket())
            .with_storage_backend(StorageBackend::S3 {
                region: Some("eu-west-1".to_string()),
                access_key: Some("key".to_string()),
                secret_key: Some("secret".to_string()),
                endpoint: None,
            })
            .build_dependencies();

        assert!(deps.is_ok());
    }
}
