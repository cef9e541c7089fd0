use anyhow::{Context, Result};
use backup_retention::{
    BucketName, CleanupOptions, CleanupService, PolicySource,
    app::{AppBuilder, AppConfig, StorageBackend},
};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "backup-cleaner")]
#[command(
    about = "Delete expired backups from object storage folders according to retention policies",
    long_about = None
)]
struct Cli {
    /// Bucket containing the backup folders
    #[arg(long, env = "BUCKET_NAME")]
    bucket_name: Option<String>,

    /// Retention policies: inline JSON or s3://bucket/key
    #[arg(long, env = "RETENTION_CONFIG")]
    retention_config: Option<String>,

    /// Storage backend type (s3, minio, memory)
    #[arg(long, env = "STORAGE_BACKEND", default_value = "s3")]
    storage_backend: String,

    /// S3 region
    #[arg(long, env = "S3_REGION")]
    s3_region: Option<String>,

    /// S3 endpoint URL (for S3-compatible stores and MinIO)
    #[arg(long, env = "S3_ENDPOINT")]
    s3_endpoint: Option<String>,

    /// S3 access key
    #[arg(long, env = "S3_ACCESS_KEY")]
    s3_access_key: Option<String>,

    /// S3 secret key
    #[arg(long, env = "S3_SECRET_KEY")]
    s3_secret_key: Option<String>,

    /// Use SSL for MinIO connection
    #[arg(long, env = "MINIO_USE_SSL", default_value = "false")]
    minio_use_ssl: bool,

    /// Report what would be deleted without deleting anything
    #[arg(long, env = "DRY_RUN", default_value = "false")]
    dry_run: bool,

    /// Number of folders processed concurrently
    #[arg(long, env = "FOLDER_CONCURRENCY", default_value = "1")]
    folder_concurrency: usize,

    /// Number of bulk delete requests (up to 1000 keys each) in flight per folder
    #[arg(long, env = "DELETE_CONCURRENCY", default_value = "10")]
    delete_concurrency: usize,

    /// Exit with status 2 when any folder or object failed
    #[arg(long, env = "FAIL_ON_ERROR", default_value = "false")]
    fail_on_error: bool,

    /// Log level (or a full filter directive, e.g. "backup_retention=debug")
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "text")]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Cli {
    fn to_app_config(&self) -> Result<AppConfig> {
        let bucket = non_empty(&self.bucket_name)
            .context("BUCKET_NAME environment variable is required")?;
        let bucket = BucketName::new(bucket).context("BUCKET_NAME is not a valid bucket name")?;

        let storage_backend = match self.storage_backend.as_str() {
            "memory" => StorageBackend::InMemory,
            "s3" => StorageBackend::S3 {
                region: self.s3_region.clone(),
                access_key: self.s3_access_key.clone(),
                secret_key: self.s3_secret_key.clone(),
                endpoint: self.s3_endpoint.clone(),
            },
            "minio" => {
                let endpoint = self
                    .s3_endpoint
                    .clone()
                    .context("S3_ENDPOINT is required for MinIO backend")?;
                let access_key = self
                    .s3_access_key
                    .clone()
                    .context("S3_ACCESS_KEY is required for MinIO backend")?;
                let secret_key = self
                    .s3_secret_key
                    .clone()
                    .context("S3_SECRET_KEY is required for MinIO backend")?;

                StorageBackend::MinIO {
                    endpoint,
                    access_key,
                    secret_key,
                    use_ssl: self.minio_use_ssl,
                }
            }
            _ => anyhow::bail!("Unknown storage backend: {}", self.storage_backend),
        };

        Ok(AppConfig {
            bucket,
            storage_backend,
            cleanup: CleanupOptions {
                dry_run: self.dry_run,
                folder_concurrency: self.folder_concurrency,
            },
            delete_concurrency: self.delete_concurrency,
        })
    }

    fn policy_source(&self) -> Result<PolicySource> {
        let value = non_empty(&self.retention_config)
            .context("RETENTION_CONFIG environment variable is required")?;

        Ok(PolicySource::parse(value)?)
    }

    fn init_logging(&self) -> Result<()> {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.log_level))
            .with_context(|| format!("Invalid log level: {}", self.log_level))?;

        // stdout carries the JSON report, logs go to stderr
        match self.log_format {
            LogFormat::Text => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .with_writer(std::io::stderr),
                )
                .init(),
            LogFormat::Json => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_writer(std::io::stderr),
                )
                .init(),
        }

        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging()?;

    info!("Backup cleaner execution started");

    let config = cli.to_app_config()?;
    let source = cli.policy_source()?;

    info!(
        bucket = %config.bucket,
        storage_backend = %cli.storage_backend,
        policy_source = %source,
        dry_run = config.cleanup.dry_run,
        "Configuration resolved"
    );

    let services = AppBuilder::new(config.bucket.clone())
        .with_config(config)
        .build()
        .context("Failed to build application")?;

    let report = services
        .cleanup_service
        .run_from_source(&source, Utc::now())
        .await
        .context("Backup cleanup aborted")?;

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize report")?
    );

    if cli.fail_on_error && report.has_failures() {
        return Ok(ExitCode::from(2));
    }

    Ok(ExitCode::SUCCESS)
}
