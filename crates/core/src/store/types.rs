//! Types for the object store module.

use serde::{Deserialize, Serialize};

/// Result of a successful object put.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutResult {
    /// Object key written.
    pub key: String,
    /// Object size in bytes.
    pub size_bytes: u64,
    /// SHA-256 of the stored bytes, hex-encoded.
    pub etag: String,
}
