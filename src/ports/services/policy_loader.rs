use crate::domain::{
    errors::{ConfigurationError, ConfigurationResult},
    models::PolicyConfiguration,
    value_objects::{BucketName, ObjectKey},
};
use async_trait::async_trait;

/// Object key used when an `s3://` location names only a bucket
pub const DEFAULT_CONFIG_KEY: &str = "config.json";

const S3_SCHEME: &str = "s3://";

/// Service port for resolving the retention policy configuration
#[async_trait]
pub trait PolicyLoader: Send + Sync + 'static {
    /// Resolve `source`, then parse and validate the document it points at
    async fn load(&self, source: &PolicySource) -> ConfigurationResult<PolicyConfiguration>;
}

/// Where the policy document lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicySource {
    /// The JSON document itself
    Inline(String),
    /// An object in a (possibly different) bucket
    ObjectStore { bucket: BucketName, key: ObjectKey },
}

impl PolicySource {
    /// Interpret a `RETENTION_CONFIG` value
    ///
    /// `s3://bucket/key` points at an object; `s3://bucket` alone means
    /// `s3://bucket/config.json`. Anything else is taken as inline JSON.
    pub fn parse(value: &str) -> ConfigurationResult<Self> {
        let value = value.trim();

        if value.is_empty() {
            return Err(ConfigurationError::MissingSetting {
                name: "RETENTION_CONFIG".to_string(),
            });
        }

        let Some(location) = value.strip_prefix(S3_SCHEME) else {
            return Ok(PolicySource::Inline(value.to_string()));
        };

        let (bucket, key) = match location.split_once('/') {
            Some((bucket, key)) if !key.is_empty() => (bucket, key),
            Some((bucket, _)) => (bucket, DEFAULT_CONFIG_KEY),
            None => (location, DEFAULT_CONFIG_KEY),
        };

        let invalid = |reason: String| ConfigurationError::InvalidSourceUrl {
            url: value.to_string(),
            reason,
        };

        let bucket = BucketName::new(bucket).map_err(|e| invalid(e.to_string()))?;
        let key = ObjectKey::new(key).map_err(|e| invalid(e.to_string()))?;

        Ok(PolicySource::ObjectStore { bucket, key })
    }
}

impl std::fmt::Display for PolicySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicySource::Inline(_) => write!(f, "inline JSON"),
            PolicySource::ObjectStore { bucket, key } => write!(f, "{}{}/{}", S3_SCHEME, bucket, key),
        }
    }
}
