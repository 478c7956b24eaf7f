use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};
use url::Url;

use super::error::StorageError;
use super::key::BlobKey;
use super::traits::{self, BlobStore};

/// Connection settings for an S3-compatible object store.
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    /// Endpoint of the S3-compatible service, e.g. `https://bucket.example.dev`.
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
}

/// Blob store backed by an S3-compatible bucket (path-style addressing).
pub struct S3BlobStore {
    bucket: Box<Bucket>,
    public_base: Url,
    max_size: u64,
}

impl S3BlobStore {
    pub fn new(settings: &S3Settings, public_base: Url, max_size: u64) -> Result<Self, StorageError> {
        let region = Region::Custom {
            region: settings.region.clone(),
            endpoint: settings.endpoint.clone(),
        };
        let credentials = Credentials::new(
            Some(&settings.access_key),
            Some(&settings.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Backend(format!("invalid credentials: {e}")))?;

        let bucket = Bucket::new(&settings.bucket, region, credentials)
            .map_err(backend)?
            .with_path_style();

        Ok(Self {
            bucket,
            public_base,
            max_size,
        })
    }
}

fn backend(err: S3Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

fn check_status(key: &BlobKey, status: u16) -> Result<(), StorageError> {
    match status {
        200..=299 => Ok(()),
        404 => Err(StorageError::NotFound(key.to_string())),
        other => Err(StorageError::Backend(format!(
            "unexpected status {other} for '{key}'"
        ))),
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &BlobKey, data: &[u8], content_type: &str) -> Result<(), StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let response = self
            .bucket
            .put_object_with_content_type(key.as_str(), data, content_type)
            .await
            .map_err(backend)?;
        check_status(key, response.status_code())?;

        tracing::debug!(key = %key, size = data.len(), "Stored object");
        Ok(())
    }

    async fn get(&self, key: &BlobKey) -> Result<Vec<u8>, StorageError> {
        let response = self.bucket.get_object(key.as_str()).await.map_err(backend)?;
        check_status(key, response.status_code())?;
        Ok(response.bytes().to_vec())
    }

    async fn exists(&self, key: &BlobKey) -> Result<bool, StorageError> {
        let (_, status) = self.bucket.head_object(key.as_str()).await.map_err(backend)?;
        match check_status(key, status) {
            Ok(()) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, key: &BlobKey) -> Result<bool, StorageError> {
        // S3 reports success for missing keys, so probe first.
        if !self.exists(key).await? {
            return Ok(false);
        }
        let response = self
            .bucket
            .delete_object(key.as_str())
            .await
            .map_err(backend)?;
        check_status(key, response.status_code())?;
        Ok(true)
    }

    fn public_url(&self, key: &BlobKey) -> Result<String, StorageError> {
        traits::public_url(&self.public_base, key)
    }
}
