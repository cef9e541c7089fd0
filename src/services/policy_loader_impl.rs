use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    domain::{
        errors::{ConfigurationError, ConfigurationResult},
        models::{
            DEFAULT_DAYS_TO_KEEP, DEFAULT_MIN_BACKUPS_TO_KEEP, PolicyConfiguration,
            RetentionPolicy,
        },
    },
    ports::{
        services::{PolicyLoader, PolicySource},
        storage::ConfigDocumentStore,
    },
};

/// Wire shape of the retention policy document
#[derive(Debug, Deserialize)]
struct PolicyDocument {
    #[serde(default)]
    retention_policies: Vec<PolicyEntry>,
}

/// Thresholds are read as signed integers so that negative values surface
/// as a field error instead of a generic parse failure.
#[derive(Debug, Deserialize)]
struct PolicyEntry {
    folder: String,
    #[serde(default = "default_days_to_keep")]
    days_to_keep: i64,
    #[serde(default = "default_min_backups_to_keep")]
    min_backups_to_keep: i64,
}

fn default_days_to_keep() -> i64 {
    DEFAULT_DAYS_TO_KEEP.into()
}

fn default_min_backups_to_keep() -> i64 {
    DEFAULT_MIN_BACKUPS_TO_KEEP.into()
}

impl PolicyEntry {
    fn into_policy(self) -> ConfigurationResult<RetentionPolicy> {
        let days_to_keep = threshold(&self.folder, "days_to_keep", self.days_to_keep)?;
        let min_backups_to_keep =
            threshold(&self.folder, "min_backups_to_keep", self.min_backups_to_keep)?;

        Ok(RetentionPolicy::new(
            self.folder,
            days_to_keep,
            min_backups_to_keep,
        ))
    }
}

fn threshold(folder: &str, field: &str, value: i64) -> ConfigurationResult<u32> {
    u32::try_from(value).map_err(|_| ConfigurationError::InvalidField {
        folder: folder.to_string(),
        field: field.to_string(),
        value: value.to_string(),
        expected: format!("an integer between 0 and {}", u32::MAX),
    })
}

/// Parse and validate a retention policy document
pub fn parse_policy_document(bytes: &[u8]) -> ConfigurationResult<PolicyConfiguration> {
    let document: PolicyDocument =
        serde_json::from_slice(bytes).map_err(|e| ConfigurationError::MalformedDocument {
            message: e.to_string(),
        })?;

    let policies = document
        .retention_policies
        .into_iter()
        .map(PolicyEntry::into_policy)
        .collect::<ConfigurationResult<Vec<_>>>()?;

    PolicyConfiguration::new(policies)
}

/// Implementation of the PolicyLoader
#[derive(Clone)]
pub struct PolicyLoaderImpl {
    documents: Arc<dyn ConfigDocumentStore>,
}

impl PolicyLoaderImpl {
    pub fn new(documents: Arc<dyn ConfigDocumentStore>) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl PolicyLoader for PolicyLoaderImpl {
    async fn load(&self, source: &PolicySource) -> ConfigurationResult<PolicyConfiguration> {
        let config = match source {
            PolicySource::Inline(json) => parse_policy_document(json.as_bytes()),
            PolicySource::ObjectStore { bucket, key } => {
                info!("Loading config from {}", source);

                let bytes = self
                    .documents
                    .fetch_document(bucket, key)
                    .await
                    .map_err(|e| ConfigurationError::FetchFailed {
                        location: source.to_string(),
                        message: e.to_string(),
                    })?;

                parse_policy_document(&bytes)
            }
        };

        match &config {
            Ok(config) => info!(count = config.len(), "Loaded retention policies"),
            Err(e) => error!(error = %e, "Error loading retention config"),
        }

        config
    }
}
