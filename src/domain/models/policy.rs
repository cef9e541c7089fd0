use std::collections::HashSet;

use serde::Serialize;

use crate::domain::errors::{ConfigurationError, ConfigurationResult};

/// Age threshold applied when a policy entry omits `days_to_keep`
pub const DEFAULT_DAYS_TO_KEEP: u32 = 30;

/// Floor applied when a policy entry omits `min_backups_to_keep`
pub const DEFAULT_MIN_BACKUPS_TO_KEEP: u32 = 3;

/// Retention rules for a single backup folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetentionPolicy {
    /// Key prefix the policy applies to
    pub folder: String,
    /// Backups older than this many whole days may be deleted
    pub days_to_keep: u32,
    /// The newest N backups are never deleted, whatever their age
    pub min_backups_to_keep: u32,
}

impl RetentionPolicy {
    pub fn new(folder: impl Into<String>, days_to_keep: u32, min_backups_to_keep: u32) -> Self {
        Self {
            folder: folder.into(),
            days_to_keep,
            min_backups_to_keep,
        }
    }
}

impl std::fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "folder={} days_to_keep={} min_backups_to_keep={}",
            self.folder, self.days_to_keep, self.min_backups_to_keep
        )
    }
}

/// Ordered set of retention policies, at most one per folder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyConfiguration {
    policies: Vec<RetentionPolicy>,
}

impl PolicyConfiguration {
    /// Build a configuration, rejecting empty and duplicated folders
    pub fn new(policies: Vec<RetentionPolicy>) -> ConfigurationResult<Self> {
        let mut seen = HashSet::new();

        for policy in &policies {
            if policy.folder.trim().is_empty() {
                return Err(ConfigurationError::InvalidField {
                    folder: policy.folder.clone(),
                    field: "folder".to_string(),
                    value: format!("{:?}", policy.folder),
                    expected: "a non-empty key prefix".to_string(),
                });
            }

            if !seen.insert(policy.folder.as_str()) {
                return Err(ConfigurationError::DuplicateFolder {
                    folder: policy.folder.clone(),
                });
            }
        }

        Ok(Self { policies })
    }

    pub fn policies(&self) -> &[RetentionPolicy] {
        &self.policies
    }

    pub fn iter(&self) -> impl Iterator<Item = &RetentionPolicy> {
        self.policies.iter()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
