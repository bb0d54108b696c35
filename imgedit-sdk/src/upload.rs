// ABOUTME: Object-storage upload of local images to the worker-shared network volume
// ABOUTME: Generates collision-resistant keys and returns worker-visible reference paths

use async_trait::async_trait;
use std::path::Path;
use uuid::Uuid;

use crate::constants::storage;
use crate::error::HarnessError;

/// Connection settings for the network-volume S3 endpoint. All fields are
/// required; partial configuration is rejected before any upload.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct StorageConfig {
    pub endpoint_url: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
}

/// A path identifying an uploaded object, resolvable by the remote worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageReference {
    pub remote_path: String,
}

/// The opaque put-a-file capability of an object-storage backend.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_file(&self, local_path: &Path, key: &str) -> Result<(), HarnessError>;
}

/// S3-backed implementation targeting the configured endpoint with
/// path-style addressing and static credentials.
pub struct StorageUploader {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl StorageUploader {
    pub fn new(config: &StorageConfig) -> Self {
        let credentials = aws_credential_types::Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "imgedit-static",
        );

        let s3_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(aws_sdk_s3::config::Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for StorageUploader {
    async fn put_file(&self, local_path: &Path, key: &str) -> Result<(), HarnessError> {
        let body = aws_sdk_s3::primitives::ByteStream::from_path(local_path)
            .await
            .map_err(|e| HarnessError::Upload(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| HarnessError::Upload(e.to_string()))?;

        log::debug!("uploaded {} as {}", local_path.display(), key);
        Ok(())
    }
}

/// Generate a globally-unique object key under `key_prefix`, keeping the
/// source file's extension (`.png` if it has none).
pub fn object_key(key_prefix: &str, local_path: &Path) -> String {
    let ext = local_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_else(|| storage::DEFAULT_EXTENSION.to_string());

    format!(
        "{}/{}{}",
        key_prefix.trim_end_matches('/'),
        Uuid::new_v4().simple(),
        ext
    )
}

/// Upload a local image and return the path the remote worker resolves it
/// under. Fails with `NotFound` before the backend is contacted when the
/// local file is absent. Retrying always generates a fresh key.
pub async fn upload_image(
    store: &dyn ObjectStore,
    local_path: &Path,
    key_prefix: &str,
) -> Result<StorageReference, HarnessError> {
    if !local_path.exists() {
        return Err(HarnessError::NotFound(local_path.display().to_string()));
    }

    let key = object_key(key_prefix, local_path);
    store.put_file(local_path, &key).await?;

    Ok(StorageReference {
        remote_path: format!("{}/{}", storage::WORKER_VOLUME_PREFIX, key),
    })
}
