//! S3 store construction using the object_store crate
//!
//! Credentials not given explicitly are picked up from the standard AWS
//! environment (`AWS_ACCESS_KEY_ID`, web identity, instance metadata, ...).

use object_store::{ObjectStore as ObjectStoreBackend, aws::AmazonS3Builder};
use std::sync::Arc;

use super::error::StoreError;

/// Configuration for S3 storage backend
#[derive(Debug, Clone, Default)]
pub struct S3Config {
    pub bucket: String,
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub endpoint: Option<String>,
    pub allow_http: bool,
}

/// Create an S3 store from configuration
pub fn create_s3_store(config: &S3Config) -> Result<Arc<dyn ObjectStoreBackend>, StoreError> {
    if config.access_key.is_some() != config.secret_key.is_some() {
        return Err(StoreError::InvalidConfig(
            "access key and secret key must be provided together".to_string(),
        ));
    }

    let mut builder = AmazonS3Builder::from_env().with_bucket_name(&config.bucket);

    if let Some(region) = &config.region {
        builder = builder.with_region(region);
    }

    if let Some(access_key) = &config.access_key {
        builder = builder.with_access_key_id(access_key);
    }

    if let Some(secret_key) = &config.secret_key {
        builder = builder.with_secret_access_key(secret_key);
    }

    if let Some(endpoint) = &config.endpoint {
        builder = builder.with_endpoint(endpoint);
    }

    let store = builder.with_allow_http(config.allow_http).build()?;

    Ok(Arc::new(store))
}
