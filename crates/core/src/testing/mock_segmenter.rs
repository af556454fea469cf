//! Mock segmenter for testing.

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::segmenter::{SegmentationResult, Segmenter, SegmenterError, PLAYLIST_FILENAME};

/// Mock implementation of the Segmenter trait.
///
/// Writes a playlist plus a fixed number of segment files into the output
/// directory and reports a configured duration.
#[derive(Debug)]
pub struct MockSegmenter {
    duration_secs: u64,
    segment_count: usize,
    fail_next: Arc<AtomicBool>,
}

impl MockSegmenter {
    /// Create a mock reporting the given master duration.
    pub fn new(duration_secs: u64) -> Self {
        Self {
            duration_secs,
            segment_count: 3,
            fail_next: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make every segmentation call fail.
    pub fn fail(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Segmenter for MockSegmenter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn segment(
        &self,
        _source: &Path,
        out_dir: &Path,
    ) -> Result<SegmentationResult, SegmenterError> {
        if self.fail_next.load(Ordering::SeqCst) {
            return Err(SegmenterError::SegmentationFailed {
                reason: "scripted failure".to_string(),
                stderr: None,
            });
        }

        let playlist_path = out_dir.join(PLAYLIST_FILENAME);
        tokio::fs::write(&playlist_path, "#EXTM3U\n").await?;
        for i in 0..self.segment_count {
            let name = format!("segment-{:03}.ts", i);
            tokio::fs::write(out_dir.join(name), b"ts").await?;
        }

        Ok(SegmentationResult {
            duration_secs: self.duration_secs,
            playlist_path,
            segment_count: self.segment_count,
        })
    }

    async fn validate(&self) -> Result<(), SegmenterError> {
        Ok(())
    }
}
