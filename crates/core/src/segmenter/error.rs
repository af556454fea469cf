//! Error types for the segmenter module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while producing the segmented stream.
#[derive(Debug, Error)]
pub enum SegmenterError {
    /// FFmpeg binary not found.
    #[error("ffmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// Input file not found.
    #[error("input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Segmentation process exited with a failure status.
    #[error("segmentation failed: {reason}")]
    SegmentationFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// Segmentation exceeded the configured timeout and was killed.
    #[error("segmentation timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The playlist was not produced.
    #[error("playlist missing after segmentation: {path}")]
    PlaylistMissing { path: PathBuf },

    /// I/O error while driving the encoder.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SegmenterError {
    /// Creates a segmentation failed error with captured stderr.
    pub fn segmentation_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::SegmentationFailed {
            reason: reason.into(),
            stderr,
        }
    }
}
