//! Trait definitions for the segmenter module.

use async_trait::async_trait;
use std::path::Path;

use super::error::SegmenterError;
use super::types::SegmentationResult;

/// A segmenter that renders the adaptive-streaming derivative.
///
/// One invocation produces the playlist plus all segment files in
/// `out_dir` and measures the master's duration as a side effect.
#[async_trait]
pub trait Segmenter: Send + Sync {
    /// Returns the name of this segmenter implementation.
    fn name(&self) -> &str;

    /// Segments the master at `source` into `out_dir`.
    async fn segment(&self, source: &Path, out_dir: &Path)
        -> Result<SegmentationResult, SegmenterError>;

    /// Validates that the segmenter is properly configured and ready.
    async fn validate(&self) -> Result<(), SegmenterError>;
}
