//! Filesystem-backed object store implementation.
//!
//! Buckets map to directories under a configured root and key separators
//! map to nested directories. This stands in for the platform's blob store
//! behind the same trait the production gateway implements.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tracing::debug;

use super::config::StoreConfig;
use super::error::StoreError;
use super::traits::ObjectStore;
use super::types::PutResult;

/// Filesystem-backed object store.
pub struct FsObjectStore {
    config: StoreConfig,
}

impl FsObjectStore {
    /// Creates a new store over the configured root directory.
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Maps a key to a path under the bucket, rejecting traversal components.
    fn key_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey {
                key: key.to_string(),
            });
        }
        let mut path = self.config.root.join(bucket);
        for component in key.split('/') {
            if component.is_empty() || component == "." || component == ".." {
                return Err(StoreError::InvalidKey {
                    key: key.to_string(),
                });
            }
            path.push(component);
        }
        Ok(path)
    }

    /// Buffered copy that hashes the bytes as they stream through.
    async fn copy_hashed(
        &self,
        source: &Path,
        dest: &Path,
    ) -> Result<(u64, String), std::io::Error> {
        let source_file = File::open(source).await?;
        let dest_file = File::create(dest).await?;

        let mut reader = BufReader::with_capacity(self.config.buffer_size, source_file);
        let mut writer = BufWriter::with_capacity(self.config.buffer_size, dest_file);

        let mut hasher = Sha256::new();
        let mut total_bytes = 0u64;
        let mut buffer = vec![0u8; self.config.buffer_size.min(1024 * 1024)];

        loop {
            let bytes_read = reader.read(&mut buffer).await?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
            writer.write_all(&buffer[..bytes_read]).await?;
            total_bytes += bytes_read as u64;
        }

        writer.flush().await?;
        Ok((total_bytes, format!("{:x}", hasher.finalize())))
    }

    /// Collects keys under a directory, relative to the bucket root.
    async fn collect_keys(
        bucket_root: &Path,
        dir: &Path,
        out: &mut Vec<String>,
    ) -> Result<(), std::io::Error> {
        let mut pending = vec![dir.to_path_buf()];
        while let Some(current) = pending.pop() {
            let mut entries = fs::read_dir(&current).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if let Ok(relative) = path.strip_prefix(bucket_root) {
                    out.push(relative.to_string_lossy().replace('\\', "/"));
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    fn name(&self) -> &str {
        "fs"
    }

    async fn ensure_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        // create_dir_all succeeds when the directory already exists, which
        // also makes racing creations harmless.
        fs::create_dir_all(self.config.root.join(bucket))
            .await
            .map_err(|e| StoreError::BucketCreateFailed {
                bucket: bucket.to_string(),
                source: e,
            })
    }

    async fn get_to_file(&self, bucket: &str, key: &str, dest: &Path) -> Result<u64, StoreError> {
        let object_path = self.key_path(bucket, key)?;
        if !object_path.exists() {
            return Err(StoreError::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::LocalFile {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        let (bytes, _etag) = self
            .copy_hashed(&object_path, dest)
            .await
            .map_err(|e| StoreError::read_failed(bucket, key, e))?;
        debug!(bucket, key, bytes, "fetched object");
        Ok(bytes)
    }

    async fn put_from_file(
        &self,
        bucket: &str,
        key: &str,
        source: &Path,
    ) -> Result<PutResult, StoreError> {
        if !source.exists() {
            return Err(StoreError::LocalFile {
                path: source.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "source missing"),
            });
        }
        let object_path = self.key_path(bucket, key)?;
        if let Some(parent) = object_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::write_failed(bucket, key, e))?;
        }
        let (size_bytes, etag) = self
            .copy_hashed(source, &object_path)
            .await
            .map_err(|e| StoreError::write_failed(bucket, key, e))?;
        debug!(bucket, key, size_bytes, "stored object");
        Ok(PutResult {
            key: key.to_string(),
            size_bytes,
            etag,
        })
    }

    async fn remove(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        let object_path = self.key_path(bucket, key)?;
        match fs::remove_file(&object_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::write_failed(bucket, key, e)),
        }
    }

    async fn remove_prefix(&self, bucket: &str, prefix: &str) -> Result<(), StoreError> {
        let prefix_path = self.key_path(bucket, prefix)?;
        match fs::remove_dir_all(&prefix_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::write_failed(bucket, prefix, e)),
        }
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, StoreError> {
        let bucket_root = self.config.root.join(bucket);
        if !bucket_root.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        Self::collect_keys(&bucket_root, &bucket_root, &mut keys)
            .await
            .map_err(|e| StoreError::read_failed(bucket, prefix, e))?;

        keys.retain(|k| k.starts_with(prefix));
        keys.sort();
        Ok(keys)
    }

    async fn commit_prefix(
        &self,
        bucket: &str,
        from_prefix: &str,
        to_prefix: &str,
    ) -> Result<(), StoreError> {
        let from_path = self.key_path(bucket, from_prefix)?;
        let to_path = self.key_path(bucket, to_prefix)?;

        let promote = async {
            // Last writer wins: clear the canonical prefix before renaming.
            match fs::remove_dir_all(&to_path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
            if let Some(parent) = to_path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::rename(&from_path, &to_path).await
        };

        promote.await.map_err(|e| StoreError::PromoteFailed {
            bucket: bucket.to_string(),
            from: from_prefix.to_string(),
            to: to_prefix.to_string(),
            source: e,
        })
    }
}
