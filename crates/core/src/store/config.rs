//! Configuration for the object store module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the filesystem-backed object store.
///
/// The store knows nothing about what the buckets mean; bucket names are
/// chosen by callers per operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root directory holding one subdirectory per bucket.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Buffer size for object copies in bytes.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

fn default_root() -> PathBuf {
    PathBuf::from("/data/media/storage")
}

fn default_buffer_size() -> usize {
    8 * 1024 * 1024 // 8 MB
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            buffer_size: default_buffer_size(),
        }
    }
}

impl StoreConfig {
    /// Sets the storage root.
    pub fn with_root(mut self, root: PathBuf) -> Self {
        self.root = root;
        self
    }
}
