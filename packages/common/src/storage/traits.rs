use async_trait::async_trait;
use url::Url;

use super::error::StorageError;
use super::key::BlobKey;

/// Key-addressed blob storage with publicly reachable objects.
///
/// Writing to an existing key replaces the object.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under `key`, replacing any previous object.
    async fn put(&self, key: &BlobKey, data: &[u8], content_type: &str)
    -> Result<(), StorageError>;

    /// Retrieve all bytes stored under `key`.
    async fn get(&self, key: &BlobKey) -> Result<Vec<u8>, StorageError>;

    /// Check whether an object exists.
    async fn exists(&self, key: &BlobKey) -> Result<bool, StorageError>;

    /// Delete an object.
    ///
    /// Returns `true` if the object was deleted, `false` if it did not exist.
    async fn delete(&self, key: &BlobKey) -> Result<bool, StorageError>;

    /// URL under which clients can fetch the object.
    fn public_url(&self, key: &BlobKey) -> Result<String, StorageError>;
}

/// Resolve `key` against a public base URL.
///
/// The base is treated as a directory even without a trailing slash, and
/// key characters that are not URL-safe are percent-encoded.
pub fn public_url(base: &Url, key: &BlobKey) -> Result<String, StorageError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    // "./" keeps a first segment containing ':' from being read as a scheme.
    base.join(&format!("./{key}"))
        .map(String::from)
        .map_err(|e| StorageError::InvalidKey(format!("cannot build public URL: {e}")))
}
