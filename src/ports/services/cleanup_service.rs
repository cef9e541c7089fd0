use crate::{
    domain::{
        errors::ConfigurationError,
        models::{CleanupReport, FolderReport, PolicyConfiguration, RetentionPolicy},
    },
    ports::services::PolicySource,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Service port for the scheduled backup cleanup job
#[async_trait]
pub trait CleanupService: Send + Sync + 'static {
    /// List, decide and delete for a single folder
    ///
    /// Never fails: listing and deletion errors are captured in the report.
    async fn process_folder(&self, policy: &RetentionPolicy, now: DateTime<Utc>) -> FolderReport;

    /// Apply every policy of the configuration
    async fn run(&self, policies: &PolicyConfiguration, now: DateTime<Utc>) -> CleanupReport;

    /// Load the configuration from `source`, then run it
    async fn run_from_source(
        &self,
        source: &PolicySource,
        now: DateTime<Utc>,
    ) -> Result<CleanupReport, CleanupError>;
}

/// Errors that abort a whole cleanup run
#[derive(Debug, thiserror::Error)]
pub enum CleanupError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}
