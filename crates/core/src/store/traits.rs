//! Trait definitions for the object store module.

use async_trait::async_trait;
use std::path::Path;

use super::error::StoreError;
use super::types::PutResult;

/// Addressable blob storage with named buckets.
///
/// Keys may contain `/` separators; a trailing-`/` convention is not used,
/// prefixes are plain string prefixes over key components.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns the name of this store implementation.
    fn name(&self) -> &str;

    /// Creates the bucket if it does not exist. Idempotent and safe to race.
    async fn ensure_bucket(&self, bucket: &str) -> Result<(), StoreError>;

    /// Downloads an object into a local file, returning the byte count.
    async fn get_to_file(&self, bucket: &str, key: &str, dest: &Path) -> Result<u64, StoreError>;

    /// Uploads a local file as an object, unmodified.
    async fn put_from_file(
        &self,
        bucket: &str,
        key: &str,
        source: &Path,
    ) -> Result<PutResult, StoreError>;

    /// Removes an object. Removing a missing object is not an error.
    async fn remove(&self, bucket: &str, key: &str) -> Result<(), StoreError>;

    /// Removes every object under a key prefix. Missing prefixes are fine.
    async fn remove_prefix(&self, bucket: &str, prefix: &str) -> Result<(), StoreError>;

    /// Lists object keys under a prefix, sorted.
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Atomically promotes every object under `from_prefix` to `to_prefix`,
    /// replacing anything previously published there (last writer wins).
    async fn commit_prefix(
        &self,
        bucket: &str,
        from_prefix: &str,
        to_prefix: &str,
    ) -> Result<(), StoreError>;
}
