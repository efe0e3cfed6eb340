//! S3-compatible storage client.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Video artifacts land under this prefix.
pub const VIDEO_KEY_PREFIX: &str = "lectures";

/// Audio-only artifacts land under a distinct prefix so degraded outputs
/// are distinguishable in the bucket.
pub const AUDIO_KEY_PREFIX: &str = "audio";

/// Attempts to verify the public URL after upload.
const URL_VERIFY_ATTEMPTS: u32 = 3;

/// Delay between URL verification attempts.
const URL_VERIFY_DELAY: Duration = Duration::from_secs(1);

/// Configuration for the storage client.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// S3 API endpoint URL
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// Region ("auto" for R2-style providers)
    pub region: String,
    /// Base URL objects are publicly served from (CDN or public bucket host)
    pub public_base_url: String,
}

impl StorageConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("STORAGE_ENDPOINT_URL")
                .map_err(|_| StorageError::config_error("STORAGE_ENDPOINT_URL not set"))?,
            access_key_id: std::env::var("STORAGE_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("STORAGE_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("STORAGE_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("STORAGE_SECRET_ACCESS_KEY not set"))?,
            bucket_name: std::env::var("STORAGE_BUCKET_NAME")
                .map_err(|_| StorageError::config_error("STORAGE_BUCKET_NAME not set"))?,
            region: std::env::var("STORAGE_REGION").unwrap_or_else(|_| "auto".to_string()),
            public_base_url: std::env::var("STORAGE_PUBLIC_BASE_URL")
                .map_err(|_| StorageError::config_error("STORAGE_PUBLIC_BASE_URL not set"))?,
        })
    }
}

/// Publishes artifacts and resolves their public URLs.
#[async_trait]
pub trait ArtifactPublisher: Send + Sync {
    /// Upload a local file and return its public URL.
    async fn publish(
        &self,
        local_file: &Path,
        job_id: &str,
        content_type: &str,
    ) -> StorageResult<String>;
}

/// S3-compatible storage client.
#[derive(Clone)]
pub struct StorageClient {
    client: Client,
    http: reqwest::Client,
    bucket: String,
    public_base_url: String,
}

impl StorageClient {
    /// Create a new client from configuration.
    pub fn new(config: StorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "lectura",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(sdk_config),
            http: reqwest::Client::new(),
            bucket: config.bucket_name,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self::new(StorageConfig::from_env()?))
    }

    /// Upload a file. Overwrite-allowed: re-publishing the same key is
    /// idempotent by design.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        key: &str,
        content_type: &str,
    ) -> StorageResult<()> {
        let path = path.as_ref();
        debug!("Uploading {} to {}", path.display(), key);

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        info!("Uploaded {} to {}", path.display(), key);
        Ok(())
    }

    /// Public URL for a key.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    /// Verify the public URL actually serves the object.
    ///
    /// An upload that "succeeds" but yields no retrievable URL is a failed
    /// publish, not a success with a broken link.
    async fn verify_url(&self, url: &str) -> StorageResult<()> {
        let mut last_status = String::new();

        for attempt in 1..=URL_VERIFY_ATTEMPTS {
            match self.http.head(url).send().await {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => {
                    last_status = response.status().to_string();
                }
                Err(e) => {
                    last_status = e.to_string();
                }
            }

            if attempt < URL_VERIFY_ATTEMPTS {
                tokio::time::sleep(URL_VERIFY_DELAY).await;
            }
        }

        Err(StorageError::UrlUnresolved(format!(
            "{url} ({last_status})"
        )))
    }
}

/// Object key for an artifact of the given content type.
pub fn artifact_key(job_id: &str, content_type: &str) -> String {
    if content_type.starts_with("audio/") {
        format!("{AUDIO_KEY_PREFIX}/{job_id}.mp3")
    } else {
        format!("{VIDEO_KEY_PREFIX}/{job_id}.mp4")
    }
}

#[async_trait]
impl ArtifactPublisher for StorageClient {
    async fn publish(
        &self,
        local_file: &Path,
        job_id: &str,
        content_type: &str,
    ) -> StorageResult<String> {
        let key = artifact_key(job_id, content_type);

        self.upload_file(local_file, &key, content_type).await?;
        let url = self.public_url(&key);
        self.verify_url(&url).await?;
        Ok(url)
    }
}
