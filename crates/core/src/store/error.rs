//! Error types for the object store module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur against the object store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to create a bucket.
    #[error("failed to create bucket {bucket}")]
    BucketCreateFailed {
        bucket: String,
        #[source]
        source: std::io::Error,
    },

    /// Requested object does not exist.
    #[error("object not found: {bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },

    /// Key contains path components the store refuses to map.
    #[error("invalid object key: {key}")]
    InvalidKey { key: String },

    /// Failed to read an object.
    #[error("failed to read {bucket}/{key}")]
    ReadFailed {
        bucket: String,
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write an object.
    #[error("failed to write {bucket}/{key}")]
    WriteFailed {
        bucket: String,
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to promote a staged prefix to its canonical location.
    #[error("failed to promote prefix {from} to {to} in {bucket}")]
    PromoteFailed {
        bucket: String,
        from: String,
        to: String,
        #[source]
        source: std::io::Error,
    },

    /// Local file involved in a get/put was not usable.
    #[error("local file error at {path}")]
    LocalFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Creates a read failed error.
    pub fn read_failed(bucket: &str, key: &str, source: std::io::Error) -> Self {
        Self::ReadFailed {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source,
        }
    }

    /// Creates a write failed error.
    pub fn write_failed(bucket: &str, key: &str, source: std::io::Error) -> Self {
        Self::WriteFailed {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source,
        }
    }
}
